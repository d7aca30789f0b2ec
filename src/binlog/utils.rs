//! 解码文本的工具函数

use std::{borrow::Cow, str};

/// 嗅探时检查的最大字节数
pub const SNIFF_LEN: usize = 4096;

/// 只有解码后的 mysqlbinlog 输出才会出现的标记
const DECODED_MARKERS: [&[u8]; 5] = [
    b"### INSERT INTO",
    b"### UPDATE",
    b"### DELETE FROM",
    b"BINLOG",
    b"PSEUDO_SLAVE_MODE",
];

/// 判断一段样本是否像 `mysqlbinlog -v` 的文本输出
///
/// 只检查前 4 KiB：必须包含至少一个解码标记，且除制表符和换行外不含控制字节。
/// 原始二进制 binlog 文件会因为控制字节被拒绝。
#[must_use]
pub fn looks_like_decoded_text(sample: &[u8]) -> bool {
    let head = &sample[..sample.len().min(SNIFF_LEN)];

    if head
        .iter()
        .any(|&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')) || b == 0x7f)
    {
        return false;
    }

    DECODED_MARKERS.iter().any(|marker| contains(head, marker))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// 去掉行尾的 `\n` / `\r\n`
#[must_use]
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// 把一行字节转换为字符串
///
/// 有效 UTF-8 时借用原始字节；否则做有损转换，无效序列替换为 U+FFFD，
/// 解析继续进行。
pub fn line_bytes_to_str(line_bytes: &[u8], _line_num: usize) -> Cow<'_, str> {
    let line_bytes = trim_line_ending(line_bytes);
    match str::from_utf8(line_bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_e) => {
            #[cfg(feature = "logging")]
            tracing::warn!(line = _line_num, error = %_e, "发现无效 UTF-8 字节序列，按有损方式解码");
            String::from_utf8_lossy(line_bytes)
        }
    }
}
