//! 位置值解码
//!
//! 把 `@N=<raw>` 中的 `<raw>` 转换为 [`ScalarValue`]。解码是全函数：
//! 任何输入都会得到一个值，格式异常的 token 走修复路径而不是报错。

use crate::binlog::types::ScalarValue;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMERIC_RE: Regex = Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap();
    // 无符号/有符号双重表示，例如 `-1 (4294967295)`
    static ref DUAL_NUMERIC_RE: Regex = Regex::new(r"^(-?\d+)\s+\(.+\)$").unwrap();
}

/// 修复路径的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// `NULL` 后面跟了多余字符，例如 `NULL54`
    CorruptNull,
    /// 以单引号开头但没有结束引号（被截断）
    Truncated,
    /// 无法识别的裸文本
    Unquoted,
}

/// 解码一个值 token
///
/// ```
/// use binlog_analysis::binlog::{decode, ScalarValue};
///
/// assert_eq!(decode("NULL"), ScalarValue::Null);
/// assert_eq!(decode("12.50"), ScalarValue::Numeric("12.50".into()));
/// assert_eq!(decode("'it\\'s'"), ScalarValue::Text("it's".into()));
/// assert_eq!(decode("NULL54"), ScalarValue::Null);
/// ```
pub fn decode(raw: &str) -> ScalarValue {
    decode_with_repair(raw).0
}

/// 解码并返回是否经过修复
pub fn decode_with_repair(raw: &str) -> (ScalarValue, Option<Repair>) {
    if raw == "NULL" {
        return (ScalarValue::Null, None);
    }

    if NUMERIC_RE.is_match(raw) {
        return (ScalarValue::Numeric(raw.to_string()), None);
    }

    if let Some(caps) = DUAL_NUMERIC_RE.captures(raw) {
        return (ScalarValue::Numeric(caps[1].to_string()), None);
    }

    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return (ScalarValue::Text(unescape(&raw[1..raw.len() - 1])), None);
    }

    repair(raw)
}

fn repair(raw: &str) -> (ScalarValue, Option<Repair>) {
    if raw.starts_with("NULL") {
        return (ScalarValue::Null, Some(Repair::CorruptNull));
    }

    if let Some(rest) = raw.strip_prefix('\'') {
        return (ScalarValue::Text(strip_control(rest)), Some(Repair::Truncated));
    }

    (ScalarValue::Text(strip_control(raw).trim().to_string()), Some(Repair::Unquoted))
}

/// 单次从左到右处理反斜杠转义：`\\` `\n` `\r` `\t` `\'`，其余原样保留
fn unescape(body: &str) -> String {
    if !body.contains('\\') {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// 去掉不可打印控制字符，保留制表符与换行
fn strip_control(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ScalarValue {
        ScalarValue::Text(s.to_string())
    }

    #[test]
    fn test_null_and_numbers() {
        assert_eq!(decode("NULL"), ScalarValue::Null);
        assert_eq!(decode("0"), ScalarValue::Numeric("0".into()));
        assert_eq!(decode("-42"), ScalarValue::Numeric("-42".into()));
        assert_eq!(
            decode("12345678901234567890.000000001"),
            ScalarValue::Numeric("12345678901234567890.000000001".into())
        );
    }

    #[test]
    fn test_dual_representation_keeps_leading_digits() {
        assert_eq!(decode("-1 (4294967295)"), ScalarValue::Numeric("-1".into()));
        assert_eq!(decode("200 (-56)"), ScalarValue::Numeric("200".into()));
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(decode("''"), text(""));
        assert_eq!(decode("'2024-12-01 10:30:20'"), text("2024-12-01 10:30:20"));
        assert_eq!(decode(r"'John\'s Name'"), text("John's Name"));
        assert_eq!(decode(r"'a\nb\tc\rd'"), text("a\nb\tc\rd"));
        assert_eq!(decode(r"'C:\\temp'"), text(r"C:\temp"));
        // `\\n` 是反斜杠加字母 n，而不是换行
        assert_eq!(decode(r"'\\n'"), text(r"\n"));
        assert_eq!(decode(r"'\x00'"), text(r"\x00"));
    }

    #[test]
    fn test_corrupt_null_is_repaired_to_null() {
        assert_eq!(decode_with_repair("NULL54"), (ScalarValue::Null, Some(Repair::CorruptNull)));
        assert_eq!(decode("NULLabc"), ScalarValue::Null);
    }

    #[test]
    fn test_truncated_string() {
        let (value, repair) = decode_with_repair("'abc\u{1}def");
        assert_eq!(value, text("abcdef"));
        assert_eq!(repair, Some(Repair::Truncated));
        assert_eq!(decode("'"), text(""));
    }

    #[test]
    fn test_unquoted_garbage_becomes_text() {
        let (value, repair) = decode_with_repair("b'0101'\u{7f}");
        assert_eq!(value, text("b'0101'"));
        assert_eq!(repair, Some(Repair::Unquoted));
        assert_eq!(decode("1.5e+10"), text("1.5e+10"));
    }

    #[test]
    fn test_round_trip_literals() {
        for token in ["NULL", "7", "-3.14", "'plain'"] {
            assert_eq!(decode(token).to_sql_literal(), token);
        }
        assert_eq!(decode(r"'it\'s'").to_sql_literal(), "'it''s'");
    }
}
