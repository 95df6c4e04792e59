pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod file_io;
pub mod key;
pub mod logger;
pub mod mode;
pub mod screen;
pub mod session;
pub mod terminal;

pub use error::{Error, Result};

// 画面レイアウト定数
pub const STATUS_BAR_HEIGHT: u16 = 1;
pub const COMMAND_LINE_HEIGHT: u16 = 1;
pub const UI_HEIGHT: u16 = STATUS_BAR_HEIGHT + COMMAND_LINE_HEIGHT;

// Tab キーで挿入する空白数、および表示時のタブ幅
pub const TAB_STOP: usize = 4;
