//! 统计汇总与回滚脚本

use crate::binlog::ChangeOperation;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 记录分布统计
///
/// 各维度使用有序映射，输出稳定。`by_table` 的键为 `db.table`，
/// `by_hour` 的键为两位小时 `HH`，没有时间戳的记录不计入 `by_hour`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_database: BTreeMap<String, usize>,
    pub by_table: BTreeMap<String, usize>,
    pub by_hour: BTreeMap<String, usize>,
}

impl Statistics {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ChangeOperation>,
    {
        let mut stats = Self::default();
        for op in records {
            stats.add(op);
        }
        stats
    }

    pub fn add(&mut self, op: &ChangeOperation) {
        self.total += 1;
        *self.by_kind.entry(op.kind.as_str().to_string()).or_default() += 1;
        *self.by_database.entry(op.database.clone()).or_default() += 1;
        *self.by_table.entry(format!("{}.{}", op.database, op.table)).or_default() += 1;
        if let Some(hour) = op.timestamp.as_deref().and_then(hour_of) {
            *self.by_hour.entry(hour.to_string()).or_default() += 1;
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "总记录数: {}", self.total)?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {kind}: {count}")?;
        }
        for (table, count) in &self.by_table {
            writeln!(f, "  {table}: {count}")?;
        }
        Ok(())
    }
}

/// `YYYY-MM-DD HH:MM:SS` 中的小时部分
fn hour_of(timestamp: &str) -> Option<&str> {
    let hour = timestamp.get(11..13)?;
    hour.bytes().all(|b| b.is_ascii_digit()).then_some(hour)
}

/// 有时间戳记录的最早和最晚时间
pub fn time_range<'a, I>(records: I) -> Option<(String, String)>
where
    I: IntoIterator<Item = &'a ChangeOperation>,
{
    let mut range: Option<(&str, &str)> = None;
    for ts in records.into_iter().filter_map(|op| op.timestamp.as_deref()) {
        range = Some(match range {
            None => (ts, ts),
            Some((min, max)) => (min.min(ts), max.max(ts)),
        });
    }
    range.map(|(min, max)| (min.to_string(), max.to_string()))
}

/// 过滤下拉框的候选值，去重并排序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub databases: Vec<String>,
    pub tables: Vec<String>,
}

impl FilterOptions {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ChangeOperation>,
    {
        let mut databases = BTreeSet::new();
        let mut tables = BTreeSet::new();
        for op in records {
            databases.insert(op.database.as_str());
            tables.insert(op.table.as_str());
        }
        Self {
            databases: databases.into_iter().map(str::to_string).collect(),
            tables: tables.into_iter().map(str::to_string).collect(),
        }
    }
}

/// 按出现顺序的逆序拼接回滚语句，每行一条，空语句跳过
pub fn rollback_script<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ChangeOperation>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut script = String::new();
    for op in records.into_iter().rev() {
        if op.reverse_sql.is_empty() {
            continue;
        }
        script.push_str(&op.reverse_sql);
        script.push('\n');
    }
    script
}
