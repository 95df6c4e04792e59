use crate::buffer::Buffer;

/// バッファ上の位置 (0 始まり)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// 編集位置
///
/// `row < buffer.len()` かつ `col <= 行の長さ` を常に満たす。
/// 列が行の長さと等しい位置 (行末の直後) は追記用に許可する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn row(&self) -> usize {
        self.pos.row
    }

    pub fn col(&self) -> usize {
        self.pos.col
    }

    /// バッファ範囲内に収めて移動する
    pub fn set(&mut self, pos: Position, buffer: &Buffer) {
        self.pos.row = pos.row.min(buffer.len().saturating_sub(1));
        self.pos.col = pos.col.min(buffer.line_len(self.pos.row));
    }

    pub fn move_up(&mut self, buffer: &Buffer) {
        if self.pos.row > 0 {
            self.pos.row -= 1;
            self.snap_col(buffer);
        }
    }

    pub fn move_down(&mut self, buffer: &Buffer) {
        if self.pos.row + 1 < buffer.len() {
            self.pos.row += 1;
            self.snap_col(buffer);
        }
    }

    pub fn move_left(&mut self) {
        if self.pos.col > 0 {
            self.pos.col -= 1;
        }
    }

    pub fn move_right(&mut self, buffer: &Buffer) {
        if self.pos.col < buffer.line_len(self.pos.row) {
            self.pos.col += 1;
        }
    }

    /// 行末へ
    pub fn move_to_line_end(&mut self, buffer: &Buffer) {
        self.pos.col = buffer.line_len(self.pos.row);
    }

    // 短い行に移動したときに行末を超えないようにする
    fn snap_col(&mut self, buffer: &Buffer) {
        self.pos.col = self.pos.col.min(buffer.line_len(self.pos.row));
    }
}
