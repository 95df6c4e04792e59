use std::io::Write;

use tracing::info;

use crate::Result;
use crate::editor::{Editor, Signal};
use crate::key::KeySource;
use crate::screen::Screen;

/// 描画 → キー入力 → 状態更新 を終了シグナルまで繰り返す
///
/// 入力や出力のエラーはそのまま返す (呼び出し側で致命的エラーとして扱う)。
pub fn run<K, W>(
    editor: &mut Editor,
    screen: &mut Screen,
    keys: &mut K,
    out: &mut W,
) -> Result<()>
where
    K: KeySource,
    W: Write,
{
    loop {
        screen.refresh(editor, out)?;
        let key = keys.next_key()?;
        if editor.update(key) == Signal::Quit {
            info!(dirty = editor.is_dirty(), "session finished");
            return Ok(());
        }
    }
}
