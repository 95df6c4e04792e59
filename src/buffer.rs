use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::TAB_STOP;
use crate::cursor::Position;

/// 1 行分のテキスト
///
/// 列は書記素クラスタ単位で数える。`render` はタブを展開した表示用文字列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: String,
    render: String,
}

impl Row {
    pub fn new(text: String) -> Self {
        let mut row = Self {
            chars: text,
            render: String::new(),
        };
        row.update_render();
        row
    }

    pub fn chars(&self) -> &str {
        &self.chars
    }

    pub fn render(&self) -> &str {
        &self.render
    }

    /// 書記素クラスタ数
    pub fn len(&self) -> usize {
        self.chars.graphemes(true).count()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// 列 `col` の表示上の x 座標 (タブ展開・全角幅込み)
    pub fn render_x(&self, col: usize) -> usize {
        let mut x = 0;
        for g in self.chars.graphemes(true).take(col) {
            x += Self::cell_width(g, x);
        }
        x
    }

    pub fn insert_str(&mut self, at: usize, text: &str) {
        let idx = self.byte_index(at);
        self.chars.insert_str(idx, text);
        self.update_render();
    }

    pub fn insert_char(&mut self, at: usize, ch: char) {
        let idx = self.byte_index(at);
        self.chars.insert(idx, ch);
        self.update_render();
    }

    /// `at` の書記素を削除して返す
    pub fn delete_char(&mut self, at: usize) -> Option<String> {
        let (start, g) = self.chars.grapheme_indices(true).nth(at)?;
        let end = start + g.len();
        let removed = self.chars[start..end].to_string();
        self.chars.replace_range(start..end, "");
        self.update_render();
        Some(removed)
    }

    /// `at` 以降を切り取って返す
    pub fn split_off(&mut self, at: usize) -> String {
        let idx = self.byte_index(at);
        let tail = self.chars.split_off(idx);
        self.update_render();
        tail
    }

    pub fn append(&mut self, text: &str) {
        self.chars.push_str(text);
        self.update_render();
    }

    fn byte_index(&self, at: usize) -> usize {
        self.chars
            .grapheme_indices(true)
            .nth(at)
            .map(|(i, _)| i)
            .unwrap_or(self.chars.len())
    }

    fn cell_width(g: &str, x: usize) -> usize {
        if g == "\t" {
            TAB_STOP - x % TAB_STOP
        } else if caret_notation(g).is_some() {
            2
        } else {
            g.width()
        }
    }

    fn update_render(&mut self) {
        let mut render = String::with_capacity(self.chars.len());
        let mut x = 0;
        for g in self.chars.graphemes(true) {
            let w = Self::cell_width(g, x);
            if g == "\t" {
                render.push_str(&" ".repeat(w));
            } else if let Some(c) = caret_notation(g) {
                // 制御文字は端末に送らず ^M のように表示する
                render.push('^');
                render.push(c);
            } else {
                render.push_str(g);
            }
            x += w;
        }
        self.render = render;
    }
}

/// タブ以外の C0 制御文字と DEL の表示文字 (`\r` -> `M`, DEL -> `?`)
fn caret_notation(g: &str) -> Option<char> {
    let mut chars = g.chars();
    let c = chars.next()?;
    if chars.next().is_some() || c == '\t' || !c.is_ascii_control() {
        return None;
    }
    Some(char::from(c as u8 ^ 0x40))
}

/// ドキュメント全体
///
/// 行の挿入・削除・分割・結合はすべてここを経由する。常に 1 行以上を持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    rows: Vec<Row>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// 空行 1 行だけのバッファ
    pub fn new() -> Self {
        Self {
            rows: vec![Row::new(String::new())],
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<Row> = lines.into_iter().map(|l| Row::new(l.into())).collect();
        if rows.is_empty() {
            return Self::new();
        }
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// 各行の文字列
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(Row::chars)
    }

    pub fn line_len(&self, row: usize) -> usize {
        self.rows.get(row).map(Row::len).unwrap_or(0)
    }

    pub fn insert_row(&mut self, at: usize, text: String) {
        if at <= self.rows.len() {
            self.rows.insert(at, Row::new(text));
        }
    }

    /// 行を削除して内容を返す
    ///
    /// 最後の 1 行は削除せず空にする。
    pub fn delete_row(&mut self, at: usize) -> Option<String> {
        if at >= self.rows.len() {
            return None;
        }
        if self.rows.len() == 1 {
            let content = std::mem::replace(&mut self.rows[0], Row::new(String::new()));
            return Some(content.chars);
        }
        Some(self.rows.remove(at).chars)
    }

    pub fn insert_char(&mut self, pos: Position, ch: char) {
        if let Some(row) = self.rows.get_mut(pos.row) {
            row.insert_char(pos.col, ch);
        }
    }

    pub fn insert_str(&mut self, pos: Position, text: &str) {
        if let Some(row) = self.rows.get_mut(pos.row) {
            row.insert_str(pos.col, text);
        }
    }

    pub fn delete_char(&mut self, pos: Position) -> Option<String> {
        self.rows.get_mut(pos.row)?.delete_char(pos.col)
    }

    /// `pos` で行を分割し、後半を次の行にする
    pub fn split_row(&mut self, pos: Position) {
        if let Some(row) = self.rows.get_mut(pos.row) {
            let tail = row.split_off(pos.col);
            self.rows.insert(pos.row + 1, Row::new(tail));
        }
    }

    /// `row` を前の行の末尾に結合する
    ///
    /// # Returns
    ///
    /// 結合前の前の行の長さ (結合後のカーソル列)
    pub fn join_rows(&mut self, row: usize) -> Option<usize> {
        if row == 0 || row >= self.rows.len() {
            return None;
        }
        let current = self.rows.remove(row);
        let prev = &mut self.rows[row - 1];
        let joined_at = prev.len();
        prev.append(current.chars());
        Some(joined_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(buffer: &Buffer) -> Vec<&str> {
        buffer.lines().collect()
    }

    #[test]
    fn test_new_buffer_has_one_empty_row() {
        let buffer = Buffer::new();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.line_len(0), 0);
    }

    #[test]
    fn test_from_empty_lines() {
        let buffer = Buffer::from_lines(Vec::<String>::new());
        assert_eq!(contents(&buffer), vec![""]);
    }

    #[test]
    fn test_row_len_counts_graphemes() {
        let row = Row::new("héllo".to_string());
        assert_eq!(row.len(), 5);

        let row = Row::new("e\u{301}x".to_string());
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_row_insert_and_delete_multibyte() {
        let mut row = Row::new("日本".to_string());
        row.insert_char(1, 'x');
        assert_eq!(row.chars(), "日x本");

        assert_eq!(row.delete_char(2), Some("本".to_string()));
        assert_eq!(row.chars(), "日x");
        assert_eq!(row.delete_char(2), None);
    }

    #[test]
    fn test_render_expands_tabs() {
        let row = Row::new("a\tb".to_string());
        assert_eq!(row.render(), "a   b");
        assert_eq!(row.render_x(1), 1);
        assert_eq!(row.render_x(2), 4);
    }

    #[test]
    fn test_render_shows_control_chars() {
        let row = Row::new("abc\r".to_string());
        assert_eq!(row.render(), "abc^M");
        assert_eq!(row.render_x(4), 5);

        let row = Row::new("x\x1b[2Jy\x7f".to_string());
        assert_eq!(row.render(), "x^[[2Jy^?");
        assert_eq!(row.render_x(2), 3);
        // 元の文字列は変更しない
        assert_eq!(row.chars(), "x\x1b[2Jy\x7f");
    }

    #[test]
    fn test_render_x_wide_chars() {
        let row = Row::new("日本a".to_string());
        assert_eq!(row.render_x(0), 0);
        assert_eq!(row.render_x(1), 2);
        assert_eq!(row.render_x(3), 5);
    }

    #[test]
    fn test_split_row() {
        let mut buffer = Buffer::from_lines(["hello world"]);
        buffer.split_row(Position::new(0, 5));
        assert_eq!(contents(&buffer), vec!["hello", " world"]);
    }

    #[test]
    fn test_split_row_at_end() {
        let mut buffer = Buffer::from_lines(["abc", "def"]);
        buffer.split_row(Position::new(0, 3));
        assert_eq!(contents(&buffer), vec!["abc", "", "def"]);
    }

    #[test]
    fn test_join_rows() {
        let mut buffer = Buffer::from_lines(["foo", "bar", "baz"]);
        assert_eq!(buffer.join_rows(1), Some(3));
        assert_eq!(contents(&buffer), vec!["foobar", "baz"]);

        assert_eq!(buffer.join_rows(0), None);
        assert_eq!(buffer.join_rows(5), None);
    }

    #[test]
    fn test_delete_row() {
        let mut buffer = Buffer::from_lines(["line1", "line2"]);
        assert_eq!(buffer.delete_row(0), Some("line1".to_string()));
        assert_eq!(contents(&buffer), vec!["line2"]);
        assert_eq!(buffer.delete_row(3), None);
    }

    #[test]
    fn test_delete_last_remaining_row_keeps_empty_row() {
        let mut buffer = Buffer::from_lines(["only"]);
        assert_eq!(buffer.delete_row(0), Some("only".to_string()));
        assert_eq!(contents(&buffer), vec![""]);
    }

    #[test]
    fn test_insert_row_out_of_range_is_ignored() {
        let mut buffer = Buffer::from_lines(["a"]);
        buffer.insert_row(5, "x".to_string());
        assert_eq!(buffer.len(), 1);

        buffer.insert_row(1, "b".to_string());
        assert_eq!(contents(&buffer), vec!["a", "b"]);
    }
}
