use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::buffer::Buffer;

pub struct FileIO;

impl FileIO {
    /// ファイルを読み込んで行に分割する
    ///
    /// 末尾の改行は 1 つだけ取り除く。空ファイルは空行 1 行になる。
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Buffer> {
        let content = std::fs::read_to_string(path)?;
        let body = content.strip_suffix('\n').unwrap_or(&content);
        Ok(Buffer::from_lines(body.split('\n')))
    }

    /// 各行を改行付きで書き出す (最終行も改行で終える)
    pub fn save<P: AsRef<Path>>(path: P, buffer: &Buffer) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        for line in buffer.lines() {
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(())
    }
}
