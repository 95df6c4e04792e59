use std::io::{self, Stdout, Write};

use termion::raw::{IntoRawMode, RawTerminal};
use tracing::debug;

use crate::{Error, Result, UI_HEIGHT};

/// raw mode の端末
///
/// 生成時に raw mode に入り、`restore` か `Drop` で元に戻す。
pub struct Terminal {
    stdout: RawTerminal<Stdout>,
    size: (u16, u16),
    restored: bool,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let stdout = io::stdout().into_raw_mode()?;
        // ここで失敗しても stdout の Drop で raw mode は解除される
        let size = termion::terminal_size()?;
        let (cols, rows) = size;
        if rows <= UI_HEIGHT || cols == 0 {
            return Err(Error::TerminalTooSmall { rows, cols });
        }
        debug!(cols, rows, "entered raw mode");

        let mut terminal = Self {
            stdout,
            size,
            restored: false,
        };
        terminal.clear_screen()?;
        Ok(terminal)
    }

    pub fn stdout(&mut self) -> &mut RawTerminal<Stdout> {
        &mut self.stdout
    }

    /// (列数, 行数)
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        write!(
            self.stdout,
            "{}{}",
            termion::clear::All,
            termion::cursor::Goto(1, 1)
        )?;
        self.stdout.flush()
    }

    /// 画面を消して raw mode を解除する。何度呼んでもよい
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        // パニック中は画面を消さない (パニックメッセージを残す)
        write_restore_sequence(&mut self.stdout, !std::thread::panicking())?;
        self.stdout.suspend_raw_mode()?;
        debug!("terminal restored");
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn write_restore_sequence(out: &mut impl Write, clear_screen: bool) -> io::Result<()> {
    if clear_screen {
        write!(
            out,
            "{}{}",
            termion::clear::All,
            termion::cursor::Goto(1, 1)
        )?;
    } else {
        // 最後のフレームの下に出力が続くように
        write!(out, "\r\n")?;
    }
    write!(
        out,
        "{}{}",
        termion::cursor::SteadyBlock,
        termion::cursor::Show
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_sequence_clears_screen() {
        let mut out = Vec::new();
        write_restore_sequence(&mut out, true).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\x1b[2J\x1b[1;1H\x1b[2 q\x1b[?25h");
    }

    #[test]
    fn test_restore_sequence_keeps_screen_when_panicking() {
        let mut out = Vec::new();
        write_restore_sequence(&mut out, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("\x1b[2J"));
        assert!(text.ends_with("\x1b[?25h"));
    }
}
