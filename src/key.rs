use std::fmt;
use std::io::Read;

use termion::event::{Event, Key as TermKey};
use termion::input::{Events, TermRead};

use crate::{Error, Result};

/// エディタが解釈する論理キー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Tab,
    Backspace,
    Esc,
    /// エディタが扱わないキー (F キー、Home など)
    Other,
}

impl Key {
    /// 挿入可能な ASCII 印字文字 (32..=126) か
    pub fn printable(self) -> Option<char> {
        match self {
            Key::Char(c) if (' '..='~').contains(&c) => Some(c),
            _ => None,
        }
    }
}

impl From<TermKey> for Key {
    fn from(key: TermKey) -> Self {
        match key {
            // raw mode では Enter は '\r' だが termion が '\n' に正規化する
            TermKey::Char('\n') => Key::Enter,
            TermKey::Char('\t') => Key::Tab,
            TermKey::Char(c) => Key::Char(c),
            TermKey::Ctrl(c) => Key::Ctrl(c),
            TermKey::Up => Key::Up,
            TermKey::Down => Key::Down,
            TermKey::Left => Key::Left,
            TermKey::Right => Key::Right,
            TermKey::Backspace => Key::Backspace,
            TermKey::Esc => Key::Esc,
            _ => Key::Other,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Ctrl(c) => write!(f, "<C-{}>", c),
            Key::Up => write!(f, "<Up>"),
            Key::Down => write!(f, "<Down>"),
            Key::Left => write!(f, "<Left>"),
            Key::Right => write!(f, "<Right>"),
            Key::Enter => write!(f, "<Enter>"),
            Key::Tab => write!(f, "<Tab>"),
            Key::Backspace => write!(f, "<BS>"),
            Key::Esc => write!(f, "<Esc>"),
            Key::Other => write!(f, "<?>"),
        }
    }
}

/// 論理キーの供給元
pub trait KeySource {
    /// 次のキーが届くまでブロックする
    fn next_key(&mut self) -> Result<Key>;
}

/// termion のイベントパーサで入力バイト列をキーに変換する
pub struct TermKeys<R: Read> {
    events: Events<R>,
}

impl<R: Read> TermKeys<R> {
    pub fn new(input: R) -> Self {
        Self {
            events: input.events(),
        }
    }
}

impl<R: Read> KeySource for TermKeys<R> {
    fn next_key(&mut self) -> Result<Key> {
        loop {
            match self.events.next() {
                Some(Ok(Event::Key(key))) => return Ok(Key::from(key)),
                // マウスイベントは読み飛ばす
                Some(Ok(Event::Mouse(_))) => continue,
                Some(Ok(Event::Unsupported(bytes))) => return Err(Error::MalformedKey(bytes)),
                Some(Err(e)) => return Err(Error::Io(e)),
                None => return Err(Error::InputClosed),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_range() {
        assert_eq!(Key::Char(' ').printable(), Some(' '));
        assert_eq!(Key::Char('~').printable(), Some('~'));
        assert_eq!(Key::Char('a').printable(), Some('a'));
        assert_eq!(Key::Char('é').printable(), None);
        assert_eq!(Key::Char('\u{7f}').printable(), None);
        assert_eq!(Key::Tab.printable(), None);
        assert_eq!(Key::Ctrl('c').printable(), None);
    }

    #[test]
    fn test_from_term_key() {
        assert_eq!(Key::from(TermKey::Char('\n')), Key::Enter);
        assert_eq!(Key::from(TermKey::Char('\t')), Key::Tab);
        assert_eq!(Key::from(TermKey::Char('x')), Key::Char('x'));
        assert_eq!(Key::from(TermKey::Backspace), Key::Backspace);
        assert_eq!(Key::from(TermKey::Esc), Key::Esc);
        assert_eq!(Key::from(TermKey::Home), Key::Other);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Key::Esc.to_string(), "<Esc>");
        assert_eq!(Key::Up.to_string(), "<Up>");
        assert_eq!(Key::Char('d').to_string(), "d");
        assert_eq!(Key::Ctrl('s').to_string(), "<C-s>");
    }

    #[test]
    fn test_term_keys_decodes_bytes() {
        let mut keys = TermKeys::new(&b"i\x1b[A\r\x7f\t"[..]);

        assert_eq!(keys.next_key().unwrap(), Key::Char('i'));
        // エスケープシーケンスは 1 つの矢印キーにまとまる
        assert_eq!(keys.next_key().unwrap(), Key::Up);
        assert_eq!(keys.next_key().unwrap(), Key::Enter);
        assert_eq!(keys.next_key().unwrap(), Key::Backspace);
        assert_eq!(keys.next_key().unwrap(), Key::Tab);
    }

    #[test]
    fn test_term_keys_arrows() {
        let mut keys = TermKeys::new(&b"\x1b[B\x1b[C\x1b[D"[..]);

        assert_eq!(keys.next_key().unwrap(), Key::Down);
        assert_eq!(keys.next_key().unwrap(), Key::Right);
        assert_eq!(keys.next_key().unwrap(), Key::Left);
    }

    #[test]
    fn test_term_keys_malformed_sequence() {
        let mut keys = TermKeys::new(&b"\x1b[9999z"[..]);

        assert!(matches!(keys.next_key(), Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_term_keys_end_of_input() {
        let mut keys = TermKeys::new(&b"q"[..]);

        assert_eq!(keys.next_key().unwrap(), Key::Char('q'));
        assert!(matches!(keys.next_key(), Err(Error::InputClosed)));
    }
}
