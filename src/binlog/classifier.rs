//! 行分类
//!
//! 把一行解码文本归入 [`LineKind`] 的某一类。规则按固定优先级检查，
//! 第一个命中的规则生效；分类是纯函数，不依赖任何解析状态。

use crate::binlog::types::{ChangeKind, UNKNOWN};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// 2000-01-01 00:00:00 UTC，不大于该值的秒数不按 Unix 时间换算
pub const DEFAULT_MIN_UNIX_TIMESTAMP: i64 = 946_684_800;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

lazy_static! {
    static ref SET_TIMESTAMP_RE: Regex =
        Regex::new(r"^SET\s+TIMESTAMP\s*=\s*(\d+)").unwrap();
    static ref HEADER_YYMMDD_RE: Regex =
        Regex::new(r"^#(\d{6})\s+(\d{1,2}:\d{2}:\d{2})\s+server id\s+(\d+)").unwrap();
    static ref HEADER_ISO_RE: Regex =
        Regex::new(r"^#(\d{4}-\d{2}-\d{2})\s+(\d{1,2}:\d{2}:\d{2})\s+server id\s+(\d+)").unwrap();
    static ref HEADER_UNIX_RE: Regex =
        Regex::new(r"^#(\d{10})(?:\s+(\d{1,2}:\d{2}:\d{2}))?\s+server id\s+(\d+)").unwrap();
    static ref HEADER_YYYYMMDD_RE: Regex =
        Regex::new(r"^#(\d{8})\s+(\d{1,2}:\d{2}:\d{2})\s+server id\s+(\d+)").unwrap();
    static ref HEADER_DIGITS_RE: Regex =
        Regex::new(r"^#(\d+)\s+(\d{1,2}:\d{2}:\d{2})\s+server id\s+(\d+)").unwrap();
    static ref SERVER_ID_RE: Regex = Regex::new(r"server id\s+(\d+)").unwrap();
    static ref XID_RE: Regex = Regex::new(r"Xid\s*=\s*(\d+)").unwrap();
    static ref GTID_RE: Regex =
        Regex::new(r"GTID(?:_NEXT)?\s*=\s*'?([^\s,'/]+)").unwrap();
    static ref STATEMENT_RE: Regex =
        Regex::new(r"^###\s+(INSERT INTO|UPDATE|DELETE FROM)\b\s*(.*)$").unwrap();
    static ref QUOTED_TABLE_RE: Regex = Regex::new(r"^`([^`]+)`\.`([^`]+)`").unwrap();
    static ref BARE_TABLE_RE: Regex = Regex::new(r"^`?([^\s.`]+)`?\.`?([^\s.`]+)`?").unwrap();
    static ref SINGLE_TABLE_RE: Regex = Regex::new(r"^`?([^\s.`]+)`?\s*$").unwrap();
    static ref SECTION_RE: Regex = Regex::new(r"^###\s+(SET|WHERE)\s*$").unwrap();
    static ref VALUE_RE: Regex = Regex::new(r"^###\s+@(\d+)=(.*)$").unwrap();
    static ref BOUNDARY_RE: Regex =
        Regex::new(r"^(?:(?:XA\s+)?(?:BEGIN|COMMIT|ROLLBACK)\b|# at \d+|#.*\bend_log_pos\b)").unwrap();
    static ref DATE_HINT_RE: Regex =
        Regex::new(r"^#.*?(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2})").unwrap();
}

/// UPDATE 的值分段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// 新值
    Set,
    /// 旧值
    Where,
}

/// 一行文本的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `SET TIMESTAMP=<秒>`；秒数不大于阈值时 `timestamp` 为 `None`
    ///
    /// 与事件头里的时间没有优先级之分，按出现顺序覆盖，后出现的生效。
    SetTimestamp { timestamp: Option<String> },
    /// `# ... server id N ...` 事件头；同一行上的 `Xid = N` 一并带出
    ///
    /// 事件头会结束当前打开的记录，`Statement` 和 `Boundary` 同样如此。
    ServerHeader {
        server_id: String,
        timestamp: Option<String>,
        xid: Option<String>,
    },
    Xid(String),
    Gtid(String),
    /// `### INSERT INTO` / `### UPDATE` / `### DELETE FROM`
    Statement {
        kind: ChangeKind,
        database: String,
        table: String,
    },
    Section(Section),
    /// `### @N=<raw>`
    Value { column: u32, raw: &'a str },
    /// BEGIN / COMMIT / ROLLBACK / 事件位置行
    Boundary,
    /// 其他 `#` 行中出现的 `YYYY-MM-DD HH:MM:SS`
    DateHint(String),
    Other,
}

/// 行分类器，持有 Unix 时间换算阈值
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier {
    min_unix_timestamp: i64,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self { min_unix_timestamp: DEFAULT_MIN_UNIX_TIMESTAMP }
    }
}

/// 使用默认阈值分类一行
pub fn classify(line: &str) -> LineKind<'_> {
    LineClassifier::default().classify(line)
}

impl LineClassifier {
    pub fn new(min_unix_timestamp: i64) -> Self {
        Self { min_unix_timestamp }
    }

    pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        let line = line.trim();

        if let Some(caps) = SET_TIMESTAMP_RE.captures(line) {
            let timestamp = caps[1]
                .parse::<i64>()
                .ok()
                .filter(|&secs| secs > self.min_unix_timestamp)
                .and_then(format_unix);
            return LineKind::SetTimestamp { timestamp };
        }

        if line.starts_with('#') && line.contains("server id") {
            return self.classify_header(line);
        }

        // 行镜像里的值可能含有 `Xid =` 之类的文本，只在非 `###` 行上识别事务标记
        if line.starts_with("###") {
            if let Some(kind) = classify_row_line(line) {
                return kind;
            }
        } else {
            if let Some(caps) = XID_RE.captures(line) {
                return LineKind::Xid(caps[1].to_string());
            }
            if line.contains("GTID") {
                if let Some(caps) = GTID_RE.captures(line) {
                    if &caps[1] != "AUTOMATIC" {
                        return LineKind::Gtid(caps[1].to_string());
                    }
                }
            }
        }

        if BOUNDARY_RE.is_match(line) {
            return LineKind::Boundary;
        }

        if let Some(caps) = DATE_HINT_RE.captures(line) {
            return LineKind::DateHint(format!("{} {}", &caps[1], &caps[2]));
        }

        LineKind::Other
    }

    fn classify_header<'a>(&self, line: &str) -> LineKind<'a> {
        let xid = XID_RE.captures(line).map(|c| c[1].to_string());

        if let Some(caps) = HEADER_YYMMDD_RE.captures(line) {
            let d = &caps[1];
            let timestamp = format!("20{}-{}-{} {}", &d[0..2], &d[2..4], &d[4..6], pad_time(&caps[2]));
            return header(&caps[3], Some(timestamp), xid);
        }

        if let Some(caps) = HEADER_ISO_RE.captures(line) {
            let timestamp = format!("{} {}", &caps[1], pad_time(&caps[2]));
            return header(&caps[3], Some(timestamp), xid);
        }

        if let Some(caps) = HEADER_UNIX_RE.captures(line) {
            let time = caps.get(2).map(|m| pad_time(m.as_str()));
            let timestamp = self.resolve_unix_header(&caps[1], time.as_deref());
            return header(&caps[3], Some(timestamp), xid);
        }

        if let Some(caps) = HEADER_YYYYMMDD_RE.captures(line) {
            let d = &caps[1];
            let timestamp = format!("{}-{}-{} {}", &d[0..4], &d[4..6], &d[6..8], pad_time(&caps[2]));
            return header(&caps[3], Some(timestamp), xid);
        }

        if let Some(caps) = HEADER_DIGITS_RE.captures(line) {
            let timestamp = format!("{} {}", &caps[1], pad_time(&caps[2]));
            return header(&caps[3], Some(timestamp), xid);
        }

        match SERVER_ID_RE.captures(line) {
            Some(caps) => header(&caps[1], None, xid),
            None => LineKind::Other,
        }
    }

    /// 10 位 Unix 秒换算为 UTC 日期时间
    ///
    /// 行上另带非零点的时刻时，用该时刻替换换算出的时刻，只保留换算出的日期。
    fn resolve_unix_header(&self, digits: &str, time: Option<&str>) -> String {
        let converted = digits
            .parse::<i64>()
            .ok()
            .filter(|&secs| secs > self.min_unix_timestamp)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        match (converted, time) {
            (Some(dt), Some(t)) if t != "00:00:00" => format!("{} {}", dt.format("%Y-%m-%d"), t),
            (Some(dt), _) => dt.format(DATETIME_FORMAT).to_string(),
            (None, t) => format!("{} {}", digits, t.unwrap_or("00:00:00")),
        }
    }
}

fn header<'a>(server_id: &str, timestamp: Option<String>, xid: Option<String>) -> LineKind<'a> {
    LineKind::ServerHeader { server_id: server_id.to_string(), timestamp, xid }
}

fn classify_row_line(line: &str) -> Option<LineKind<'_>> {
    if let Some(caps) = VALUE_RE.captures(line) {
        let column = caps[1].parse::<u32>().ok()?;
        let raw = caps.get(2).map_or("", |m| m.as_str());
        return Some(LineKind::Value { column, raw });
    }

    if let Some(caps) = STATEMENT_RE.captures(line) {
        let kind = match &caps[1] {
            "INSERT INTO" => ChangeKind::Insert,
            "UPDATE" => ChangeKind::Update,
            _ => ChangeKind::Delete,
        };
        let (database, table) = parse_table(caps.get(2).map_or("", |m| m.as_str()));
        return Some(LineKind::Statement { kind, database, table });
    }

    if let Some(caps) = SECTION_RE.captures(line) {
        let section = if &caps[1] == "SET" { Section::Set } else { Section::Where };
        return Some(LineKind::Section(section));
    }

    None
}

/// 解析 `` `db`.`table` `` 或 `db.table`，失败的一侧为 `unknown`
fn parse_table(rest: &str) -> (String, String) {
    let rest = rest.trim();
    let caps = QUOTED_TABLE_RE
        .captures(rest)
        .or_else(|| BARE_TABLE_RE.captures(rest));
    if let Some(caps) = caps {
        return (caps[1].to_string(), caps[2].to_string());
    }
    if let Some(caps) = SINGLE_TABLE_RE.captures(rest) {
        return (UNKNOWN.to_string(), caps[1].to_string());
    }
    (UNKNOWN.to_string(), UNKNOWN.to_string())
}

/// mysqlbinlog 的小时用空格补位（` 9:30:20`），统一补零
fn pad_time(time: &str) -> String {
    if time.len() == 7 { format!("0{time}") } else { time.to_string() }
}

fn format_unix(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(DATETIME_FORMAT).to_string())
}
