use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::TAB_STOP;
use crate::buffer::Buffer;
use crate::cursor::{Cursor, Position};
use crate::file_io::FileIO;
use crate::key::Key;
use crate::mode::Mode;

pub const UNSAVED_CHANGES_MESSAGE: &str =
    "File has unsaved changes. Use :w to save or :q! to quit without saving";

/// `update` の結果
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    /// セッション終了
    Quit,
}

/// 2 打鍵コマンド (`dd`) の待ち状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Idle,
    Operator(Key),
}

pub struct Editor {
    buffer: Buffer,
    filename: PathBuf,
    cursor: Cursor,
    mode: Mode,
    /// 未保存の変更があるか
    dirty: bool,
    status_message: String,
    /// コマンドモードの入力 (先頭の `:` は含まない)
    command_buffer: String,
    pending: Pending,
}

impl Editor {
    pub fn from_buffer(buffer: Buffer, filename: impl Into<PathBuf>) -> Self {
        Self {
            buffer,
            filename: filename.into(),
            cursor: Cursor::new(),
            mode: Mode::Normal,
            dirty: false,
            status_message: String::new(),
            command_buffer: String::new(),
            pending: Pending::Idle,
        }
    }

    pub fn open(filename: impl Into<PathBuf>) -> io::Result<Self> {
        let filename = filename.into();
        let buffer = FileIO::open(&filename)?;
        info!(file = %filename.display(), lines = buffer.len(), "opened file");
        let mut editor = Self::from_buffer(buffer, filename);
        editor.status_message = format!(
            "\"{}\" {}L",
            editor.filename.display(),
            editor.buffer.len()
        );
        Ok(editor)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn cursor(&self) -> Position {
        self.cursor.position()
    }

    /// カーソルを移動する (バッファ範囲内に丸める)
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor.set(pos, &self.buffer);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        self.pending != Pending::Idle
    }

    /// ファイルに保存
    pub fn save(&mut self) -> io::Result<()> {
        FileIO::save(&self.filename, &self.buffer)?;
        self.dirty = false;
        info!(file = %self.filename.display(), lines = self.buffer.len(), "saved file");
        Ok(())
    }

    /// キー 1 つ分の状態遷移
    pub fn update(&mut self, key: Key) -> Signal {
        trace!(%key, mode = %self.mode, "key");
        // 矢印キーはどのモードでも有効
        self.move_cursor(key);

        match self.mode {
            Mode::Normal => {
                self.process_normal(key);
                Signal::Continue
            }
            Mode::Insert => {
                self.process_insert(key);
                Signal::Continue
            }
            Mode::Command => self.process_command(key),
        }
    }

    fn move_cursor(&mut self, key: Key) {
        match key {
            Key::Up => self.cursor.move_up(&self.buffer),
            Key::Down => self.cursor.move_down(&self.buffer),
            Key::Left => self.cursor.move_left(),
            Key::Right => self.cursor.move_right(&self.buffer),
            _ => {}
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "mode change");
            self.mode = mode;
        }
    }

    fn process_normal(&mut self, key: Key) {
        if let Pending::Operator(op) = self.pending {
            self.pending = Pending::Idle;
            if (op, key) == (Key::Char('d'), Key::Char('d')) {
                self.delete_line();
                return;
            }
            // 別のキーは保留中の操作を取り消し、通常どおり処理する
            debug!(operator = %op, %key, "pending operator cancelled");
        }

        match key {
            Key::Char('i') => self.set_mode(Mode::Insert),
            Key::Char('A') => {
                self.cursor.move_to_line_end(&self.buffer);
                self.set_mode(Mode::Insert);
            }
            Key::Char('o') => {
                let row = self.cursor.row() + 1;
                self.buffer.insert_row(row, String::new());
                self.cursor.set(Position::new(row, 0), &self.buffer);
                self.dirty = true;
                self.set_mode(Mode::Insert);
            }
            Key::Char('x') => self.delete_char_at_cursor(),
            Key::Char('s') => {
                self.delete_char_at_cursor();
                self.set_mode(Mode::Insert);
            }
            Key::Char('d') => self.pending = Pending::Operator(key),
            Key::Char(':') => {
                self.command_buffer.clear();
                self.set_mode(Mode::Command);
            }
            _ => {}
        }
    }

    fn process_insert(&mut self, key: Key) {
        match key {
            Key::Esc => self.set_mode(Mode::Normal),
            Key::Enter => self.insert_newline(),
            Key::Backspace => self.backspace(),
            Key::Tab => self.insert_str(&" ".repeat(TAB_STOP)),
            key => {
                if let Some(ch) = key.printable() {
                    self.insert_char(ch);
                }
            }
        }
    }

    fn process_command(&mut self, key: Key) -> Signal {
        match key {
            Key::Esc => {
                self.command_buffer.clear();
                self.set_mode(Mode::Normal);
            }
            Key::Enter => {
                let command = std::mem::take(&mut self.command_buffer);
                self.set_mode(Mode::Normal);
                return self.execute_command(&command);
            }
            Key::Backspace => {
                self.command_buffer.pop();
            }
            key => {
                if let Some(ch) = key.printable() {
                    self.command_buffer.push(ch);
                    // コマンドモード中は見えないが、Esc や未知のコマンドの後も入力内容を残す
                    self.status_message = self.command_buffer.clone();
                }
            }
        }
        Signal::Continue
    }

    fn execute_command(&mut self, command: &str) -> Signal {
        let command = command.trim().to_lowercase();
        debug!(command = %command, "execute command");

        match command.as_str() {
            "q" => {
                if self.dirty {
                    warn!("quit refused: unsaved changes");
                    self.status_message = UNSAVED_CHANGES_MESSAGE.to_string();
                    Signal::Continue
                } else {
                    Signal::Quit
                }
            }
            "q!" => Signal::Quit,
            "w" => {
                self.write_back();
                Signal::Continue
            }
            "wq" => {
                if self.write_back() {
                    Signal::Quit
                } else {
                    Signal::Continue
                }
            }
            // 未知のコマンドは無視する
            _ => Signal::Continue,
        }
    }

    /// 保存して結果をステータスに出す。成功したら true
    fn write_back(&mut self) -> bool {
        match self.save() {
            Ok(()) => {
                self.status_message = format!(
                    "\"{}\" {}L written",
                    self.filename.display(),
                    self.buffer.len()
                );
                true
            }
            Err(e) => {
                warn!(file = %self.filename.display(), error = %e, "save failed");
                self.status_message = format!("Error: {}", e);
                false
            }
        }
    }

    /// 文字を挿入
    fn insert_char(&mut self, ch: char) {
        self.buffer.insert_char(self.cursor.position(), ch);
        self.cursor.move_right(&self.buffer);
        self.dirty = true;
    }

    fn insert_str(&mut self, text: &str) {
        let pos = self.cursor.position();
        self.buffer.insert_str(pos, text);
        let col = pos.col + text.chars().count();
        self.cursor.set(Position::new(pos.row, col), &self.buffer);
        self.dirty = true;
    }

    /// 改行を挿入
    fn insert_newline(&mut self) {
        let pos = self.cursor.position();
        self.buffer.split_row(pos);
        self.cursor.set(Position::new(pos.row + 1, 0), &self.buffer);
        self.dirty = true;
    }

    fn backspace(&mut self) {
        let pos = self.cursor.position();
        if pos.col > 0 {
            self.buffer.delete_char(Position::new(pos.row, pos.col - 1));
            self.cursor.move_left();
            self.dirty = true;
        } else if let Some(col) = self.buffer.join_rows(pos.row) {
            // 行頭では前の行と結合
            self.cursor.set(Position::new(pos.row - 1, col), &self.buffer);
            self.dirty = true;
        }
    }

    /// カーソル位置の文字を削除する (行末では何もしない)
    fn delete_char_at_cursor(&mut self) {
        if self.buffer.delete_char(self.cursor.position()).is_some() {
            self.dirty = true;
        }
    }

    /// 現在行を削除する (dd)
    fn delete_line(&mut self) {
        let row = self.cursor.row();
        if let Some(content) = self.buffer.delete_row(row) {
            let row = row.min(self.buffer.len() - 1);
            let col = self.buffer.line_len(row);
            self.cursor.set(Position::new(row, col), &self.buffer);
            self.dirty = true;
            debug!(row, bytes = content.len(), "deleted line");
        }
    }
}
