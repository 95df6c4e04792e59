use std::io;

use thiserror::Error;

/// エディタ外側 (端末・入力・ファイル) で発生する致命的なエラー
///
/// 編集操作そのものはエラーを返さない。保存失敗はステータスメッセージで扱う。
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// 解釈できないエスケープシーケンス
    #[error("malformed key sequence: {0:?}")]
    MalformedKey(Vec<u8>),

    #[error("input stream closed")]
    InputClosed,

    #[error("terminal too small: {cols}x{rows}")]
    TerminalTooSmall { rows: u16, cols: u16 },

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
