//! 行读取
//!
//! 从文件或任意 `BufRead` 按字节读取行，无效 UTF-8 做有损转换而不是报错。

use crate::binlog::utils::{SNIFF_LEN, line_bytes_to_str, looks_like_decoded_text};
use crate::error::Result;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// 有损 UTF-8 行迭代器
///
/// 只有底层读取失败才会产生 `Err`，之后迭代结束。
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_num: usize,
    failed: bool,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), line_num: 0, failed: false }
    }

    /// 已读取的行数
    pub fn line_num(&self) -> usize {
        self.line_num
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_num += 1;
                Some(Ok(line_bytes_to_str(&self.buf, self.line_num).into_owned()))
            }
            Err(e) => {
                self.failed = true;
                #[cfg(feature = "logging")]
                tracing::error!("读取第 {} 行后发生 IO 错误: {}", self.line_num, e);
                Some(Err(e.into()))
            }
        }
    }
}

/// 打开文件并返回有损行迭代器
pub fn open_lines<P: AsRef<Path>>(path: P) -> Result<LossyLines<BufReader<File>>> {
    let file = File::open(path.as_ref())?;
    Ok(LossyLines::new(BufReader::new(file)))
}

/// 读取文件开头并判断是否为解码后的文本
pub fn sniff_file<P: AsRef<Path>>(path: P) -> Result<bool> {
    let file = File::open(path.as_ref())?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(looks_like_decoded_text(&head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_lossy_lines_from_reader() {
        let data: &[u8] = b"BEGIN\r\n###   @1='\xff'\nCOMMIT";
        let mut lines = LossyLines::new(Cursor::new(data));
        assert_eq!(lines.next().unwrap().unwrap(), "BEGIN");
        assert_eq!(lines.next().unwrap().unwrap(), "###   @1='\u{FFFD}'");
        assert_eq!(lines.next().unwrap().unwrap(), "COMMIT");
        assert!(lines.next().is_none());
        assert_eq!(lines.line_num(), 3);
    }

    #[test]
    fn test_open_and_sniff_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"BEGIN\n### DELETE FROM `d`.`t`\n###   @1=1\n").unwrap();
        drop(f);

        assert!(sniff_file(&path).unwrap());
        let lines: Vec<String> = open_lines(&path).unwrap().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 3);

        assert!(open_lines(dir.path().join("missing.txt")).is_err());
        assert!(sniff_file(dir.path().join("missing.txt")).unwrap_err().is_io_error());
    }
}
