//! 过滤、排序与分页

use crate::binlog::{ChangeKind, ChangeOperation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 缺失时间戳在排序中的取值
const MISSING_TIMESTAMP: &str = "1970-01-01 00:00:00";

/// 记录过滤条件，所有条件为与关系
///
/// 时间边界按 `YYYY-MM-DD HH:MM:SS` 字符串做闭区间比较；
/// 没有时间戳的记录不满足任何时间边界。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationFilter {
    pub kind: Option<ChangeKind>,
    pub database: Option<String>,
    pub table: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl OperationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ChangeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn table<S: Into<String>>(mut self, table: S) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn start_time<S: Into<String>>(mut self, start: S) -> Self {
        self.start_time = Some(start.into());
        self
    }

    pub fn end_time<S: Into<String>>(mut self, end: S) -> Self {
        self.end_time = Some(end.into());
        self
    }

    pub fn matches(&self, op: &ChangeOperation) -> bool {
        if self.kind.is_some_and(|kind| kind != op.kind) {
            return false;
        }
        if self.database.as_deref().is_some_and(|db| db != op.database) {
            return false;
        }
        if self.table.as_deref().is_some_and(|table| table != op.table) {
            return false;
        }

        if self.start_time.is_none() && self.end_time.is_none() {
            return true;
        }

        let Some(ts) = op.timestamp.as_deref() else {
            return false;
        };
        let after_start = self.start_time.as_deref().is_none_or(|start| ts >= start);
        let before_end = self.end_time.as_deref().is_none_or(|end| ts <= end);
        after_start && before_end
    }

    /// 按出现顺序返回满足条件的记录
    pub fn apply<'a>(&self, records: &'a [ChangeOperation]) -> Vec<&'a ChangeOperation> {
        records.iter().filter(|op| self.matches(op)).collect()
    }
}

/// 排序字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Timestamp,
    Database,
    Table,
    Kind,
    /// 出现顺序
    Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// 稳定排序：相等的记录保持出现顺序，降序时也一样
pub fn sort_operations(records: &mut [&ChangeOperation], key: SortKey, order: SortOrder) {
    if key == SortKey::Position {
        if order == SortOrder::Desc {
            records.reverse();
        }
        return;
    }

    records.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &ChangeOperation, b: &ChangeOperation, key: SortKey) -> Ordering {
    match key {
        SortKey::Timestamp => timestamp_key(a).cmp(timestamp_key(b)),
        SortKey::Database => a.database.cmp(&b.database),
        SortKey::Table => a.table.cmp(&b.table),
        SortKey::Kind => a.kind.as_str().cmp(b.kind.as_str()),
        SortKey::Position => Ordering::Equal,
    }
}

fn timestamp_key(op: &ChangeOperation) -> &str {
    op.timestamp.as_deref().unwrap_or(MISSING_TIMESTAMP)
}

/// 一页结果
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a ChangeOperation>,
    /// 过滤后的总数
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl Page<'_> {
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 { 0 } else { self.total.div_ceil(self.page_size) }
    }
}

/// 取第 `page` 页（从 1 开始）；页码为 0 按 1 处理，超出范围返回空页
pub fn paginate<'a>(records: &[&'a ChangeOperation], page: usize, page_size: usize) -> Page<'a> {
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(page_size);
    let items = records.iter().skip(offset).take(page_size).copied().collect();
    Page { items, total: records.len(), page, page_size }
}

/// 过滤 + 排序 + 分页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationQuery {
    pub filter: OperationFilter,
    pub sort_by: SortKey,
    pub order: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl Default for OperationQuery {
    fn default() -> Self {
        Self {
            filter: OperationFilter::default(),
            sort_by: SortKey::Timestamp,
            order: SortOrder::Desc,
            page: 1,
            page_size: 50,
        }
    }
}

impl OperationQuery {
    pub fn run<'a>(&self, records: &'a [ChangeOperation]) -> Page<'a> {
        let mut matched = self.filter.apply(records);
        sort_operations(&mut matched, self.sort_by, self.order);
        paginate(&matched, self.page, self.page_size)
    }
}
