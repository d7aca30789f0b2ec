//! 行变更记录的数据模型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 表名解析失败时的占位值
pub const UNKNOWN: &str = "unknown";

/// 行变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解码后的列值
///
/// 数字保持原始文本，不转换为浮点数，避免精度丢失。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ScalarValue {
    Null,
    Numeric(String),
    Text(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// 渲染为 SQL 字面量
    ///
    /// `Null` → `NULL`；数字原样输出；文本加单引号，内部单引号双写。
    pub fn to_sql_literal(&self) -> String {
        match self {
            ScalarValue::Null => "NULL".to_string(),
            ScalarValue::Numeric(digits) => digits.clone(),
            ScalarValue::Text(text) => {
                let mut out = String::with_capacity(text.len() + 2);
                out.push('\'');
                for ch in text.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
                out.push('\'');
                out
            }
        }
    }

    /// 近似占用字节数，用于内存报告
    pub(crate) fn approx_size(&self) -> usize {
        match self {
            ScalarValue::Null => 0,
            ScalarValue::Numeric(s) | ScalarValue::Text(s) => s.len(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

/// 一个位置列的值（列号沿用 binlog 中的 1 起始编号）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnValue {
    pub column: u32,
    pub value: ScalarValue,
}

impl ColumnValue {
    pub fn new(column: u32, value: ScalarValue) -> Self {
        Self { column, value }
    }

    /// 合成的列名 `col_<N>`
    pub fn column_name(&self) -> String {
        format!("col_{}", self.column)
    }
}

/// 记录创建时刻的事件上下文快照
///
/// 由状态机持有并在打开新记录时按值复制，之后的头部行不会影响已打开的记录。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventContext {
    pub timestamp: Option<String>,
    pub server_id: Option<String>,
    pub xid: Option<String>,
    pub gtid: Option<String>,
}

/// 一条行级变更
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeOperation {
    pub kind: ChangeKind,
    pub database: String,
    pub table: String,
    pub timestamp: Option<String>,
    pub server_id: Option<String>,
    pub xid: Option<String>,
    pub gtid: Option<String>,
    /// INSERT 的新值 / DELETE 的被删值
    pub values: Vec<ColumnValue>,
    /// UPDATE 的新值（SET 部分）
    pub set_values: Vec<ColumnValue>,
    /// UPDATE 的旧值（WHERE 部分）
    pub where_values: Vec<ColumnValue>,
    pub forward_sql: String,
    pub reverse_sql: String,
}

impl ChangeOperation {
    /// 创建一条空记录，上下文按值复制
    pub fn new(kind: ChangeKind, database: String, table: String, context: &EventContext) -> Self {
        Self {
            kind,
            database,
            table,
            timestamp: context.timestamp.clone(),
            server_id: context.server_id.clone(),
            xid: context.xid.clone(),
            gtid: context.gtid.clone(),
            values: Vec::new(),
            set_values: Vec::new(),
            where_values: Vec::new(),
            forward_sql: String::new(),
            reverse_sql: String::new(),
        }
    }

    /// 反引号包裹的完整表名
    pub fn qualified_table(&self) -> String {
        format!("`{}`.`{}`", self.database, self.table)
    }

    /// INSERT 写入的值
    pub fn new_values(&self) -> &[ColumnValue] {
        match self.kind {
            ChangeKind::Insert => &self.values,
            _ => &[],
        }
    }

    /// DELETE 删除的值
    pub fn removed_values(&self) -> &[ColumnValue] {
        match self.kind {
            ChangeKind::Delete => &self.values,
            _ => &[],
        }
    }

    /// 是否至少带有一个值，空记录不会被输出
    pub fn has_data(&self) -> bool {
        match self.kind {
            ChangeKind::Update => !self.set_values.is_empty() || !self.where_values.is_empty(),
            ChangeKind::Insert | ChangeKind::Delete => !self.values.is_empty(),
        }
    }

    /// 近似保留字节数
    pub fn approx_size(&self) -> usize {
        let values: usize = self
            .values
            .iter()
            .chain(&self.set_values)
            .chain(&self.where_values)
            .map(|v| v.value.approx_size() + std::mem::size_of::<ColumnValue>())
            .sum();
        let optional: usize = [&self.timestamp, &self.server_id, &self.xid, &self.gtid]
            .iter()
            .map(|s| s.as_ref().map_or(0, String::len))
            .sum();
        std::mem::size_of::<Self>()
            + self.database.len()
            + self.table.len()
            + optional
            + values
            + self.forward_sql.len()
            + self.reverse_sql.len()
    }
}
