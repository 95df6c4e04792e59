use std::io::{self, Write};

use termion::{clear, cursor, style};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::UI_HEIGHT;
use crate::buffer::Buffer;
use crate::editor::Editor;
use crate::mode::Mode;

/// ビューポート描画
///
/// スクロール位置と端末サイズだけを持つ。エディタの状態は読むだけで変更しない。
pub struct Screen {
    rows: u16,
    cols: u16,
    /// 画面先頭に表示しているバッファ行
    row_offset: usize,
}

impl Screen {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            row_offset: 0,
        }
    }

    /// テキスト表示に使える行数 (ステータスバーとメッセージ行を除く)
    pub fn editor_rows(&self) -> usize {
        self.rows.saturating_sub(UI_HEIGHT) as usize
    }

    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// カーソル行が表示範囲に入るようにスクロールする
    pub fn scroll(&mut self, cursor_row: usize) {
        let height = self.editor_rows().max(1);
        if cursor_row < self.row_offset {
            self.row_offset = cursor_row;
        } else if cursor_row >= self.row_offset + height {
            self.row_offset = cursor_row + 1 - height;
        }
    }

    /// 1 フレーム分を組み立てて一度に書き出す
    pub fn refresh(&mut self, editor: &Editor, out: &mut impl Write) -> io::Result<()> {
        self.scroll(editor.cursor().row);

        let mut frame = Vec::with_capacity(self.rows as usize * (self.cols as usize + 8));
        // カーソルを隠して左上へ
        write!(frame, "{}{}", cursor::Hide, cursor::Goto(1, 1))?;
        self.draw_rows(&mut frame, editor.buffer())?;
        self.draw_status_bar(&mut frame, editor)?;
        self.draw_message_line(&mut frame, editor)?;
        self.draw_cursor(&mut frame, editor)?;

        out.write_all(&frame)?;
        out.flush()
    }

    fn draw_rows(&self, frame: &mut impl Write, buffer: &Buffer) -> io::Result<()> {
        for i in 0..self.editor_rows() {
            match buffer.row(self.row_offset + i) {
                Some(row) => write!(frame, "{}", truncate(row.render(), self.cols as usize))?,
                // ファイルの終端を超えたら ~ を表示
                None => write!(frame, "~")?,
            }
            write!(frame, "{}\r\n", clear::UntilNewline)?;
        }
        Ok(())
    }

    fn draw_status_bar(&self, frame: &mut impl Write, editor: &Editor) -> io::Result<()> {
        let marker = if editor.is_dirty() { " [+]" } else { "" };
        let status = format!(
            " {} | {}{}",
            editor.mode().name(),
            editor.filename().display(),
            marker
        );
        let status = truncate(&status, self.cols as usize);
        let padding = (self.cols as usize).saturating_sub(status.width());

        write!(
            frame,
            "{}{}{}{}{}{}\r\n",
            style::Invert,
            style::Bold,
            status,
            " ".repeat(padding),
            style::Reset,
            clear::UntilNewline
        )
    }

    fn draw_message_line(&self, frame: &mut impl Write, editor: &Editor) -> io::Result<()> {
        let line = match editor.mode() {
            Mode::Command => format!(":{}", editor.command_buffer()),
            Mode::Normal | Mode::Insert => format!(" {}", editor.status_message()),
        };
        // 最終行なので改行しない
        write!(
            frame,
            "{}{}",
            truncate(&line, self.cols as usize),
            clear::UntilNewline
        )
    }

    fn draw_cursor(&self, frame: &mut impl Write, editor: &Editor) -> io::Result<()> {
        let goto = match editor.mode() {
            Mode::Command => {
                // コマンドライン上の入力の直後
                let x = editor.command_buffer().width() + 2;
                cursor::Goto(to_u16(x), self.rows.max(1))
            }
            Mode::Normal | Mode::Insert => {
                let pos = editor.cursor();
                let render_x = editor
                    .buffer()
                    .row(pos.row)
                    .map(|row| row.render_x(pos.col))
                    .unwrap_or(0);
                let y = pos.row.saturating_sub(self.row_offset) + 1;
                cursor::Goto(to_u16(render_x + 1), to_u16(y))
            }
        };
        write!(frame, "{}", goto)?;

        match editor.mode() {
            Mode::Normal => write!(frame, "{}", cursor::SteadyBlock)?,
            Mode::Insert | Mode::Command => write!(frame, "{}", cursor::SteadyUnderline)?,
        }
        write!(frame, "{}", cursor::Show)
    }
}

/// 表示幅 `cols` に収まる先頭部分 (書記素の途中では切らない)
fn truncate(text: &str, cols: usize) -> &str {
    let mut width = 0;
    for (i, g) in text.grapheme_indices(true) {
        width += g.width();
        if width > cols {
            return &text[..i];
        }
    }
    text
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
