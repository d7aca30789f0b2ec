//! 正向/回滚 SQL 重建
//!
//! 没有表结构信息，列名合成为 `col_<N>`，WHERE 条件只取前若干列作为近似主键。
//! 这是有意的近似：生成的语句不保证命中唯一行。

use crate::binlog::types::{ChangeKind, ChangeOperation, ColumnValue, ScalarValue};
use std::collections::HashMap;

/// WHERE 子句默认最多使用的列数
pub const DEFAULT_WHERE_PREFIX_LIMIT: usize = 5;

/// SQL 重建器
#[derive(Debug, Clone, Copy)]
pub struct SqlReconstructor {
    where_prefix_limit: usize,
}

impl Default for SqlReconstructor {
    fn default() -> Self {
        Self { where_prefix_limit: DEFAULT_WHERE_PREFIX_LIMIT }
    }
}

/// 使用默认 WHERE 列数上限生成 `(正向 SQL, 回滚 SQL)`
pub fn reconstruct(op: &ChangeOperation) -> (String, String) {
    SqlReconstructor::default().reconstruct(op)
}

impl SqlReconstructor {
    /// `limit` 为 0 时按 1 处理
    pub fn new(where_prefix_limit: usize) -> Self {
        Self { where_prefix_limit: where_prefix_limit.max(1) }
    }

    pub fn where_prefix_limit(&self) -> usize {
        self.where_prefix_limit
    }

    /// 生成 `(正向 SQL, 回滚 SQL)`
    ///
    /// ```
    /// use binlog_analysis::binlog::{ChangeKind, ChangeOperation, ColumnValue, EventContext, ScalarValue, reconstruct};
    ///
    /// let mut op = ChangeOperation::new(ChangeKind::Update, "d".into(), "t".into(), &EventContext::default());
    /// op.set_values.push(ColumnValue::new(1, ScalarValue::Numeric("2".into())));
    /// op.where_values.push(ColumnValue::new(1, ScalarValue::Numeric("1".into())));
    ///
    /// let (forward, reverse) = reconstruct(&op);
    /// assert_eq!(forward, "UPDATE `d`.`t` SET col_1 = 2 WHERE col_1 = 1;");
    /// assert_eq!(reverse, "UPDATE `d`.`t` SET col_1 = 1 WHERE col_1 = 2;");
    /// ```
    pub fn reconstruct(&self, op: &ChangeOperation) -> (String, String) {
        let table = op.qualified_table();
        match op.kind {
            ChangeKind::Insert => (
                insert_sql(&table, &op.values),
                self.delete_sql(&table, &op.values),
            ),
            ChangeKind::Delete => (
                self.delete_sql(&table, &op.values),
                insert_sql(&table, &op.values),
            ),
            ChangeKind::Update => (
                self.update_sql(&table, &op.set_values, &op.where_values),
                self.reverse_update_sql(&table, &op.set_values, &op.where_values),
            ),
        }
    }

    /// 填充记录的 `forward_sql` / `reverse_sql`
    pub fn apply(&self, op: &mut ChangeOperation) {
        let (forward, reverse) = self.reconstruct(op);
        op.forward_sql = forward;
        op.reverse_sql = reverse;
    }

    fn delete_sql(&self, table: &str, values: &[ColumnValue]) -> String {
        if values.is_empty() {
            return String::new();
        }
        format!("DELETE FROM {} WHERE {};", table, self.where_clause(values))
    }

    fn update_sql(&self, table: &str, set_values: &[ColumnValue], where_values: &[ColumnValue]) -> String {
        if set_values.is_empty() {
            return String::new();
        }

        let changed = changed_columns(set_values, where_values);
        let set_part = if changed.is_empty() {
            assignments(set_values.iter().map(|v| (v.column, &v.value)))
        } else {
            assignments(changed.iter().map(|v| (v.column, &v.value)))
        };

        let where_part = if where_values.is_empty() {
            "1=1".to_string()
        } else {
            self.where_clause(where_values)
        };

        format!("UPDATE {table} SET {set_part} WHERE {where_part};")
    }

    /// 回滚 UPDATE：SET 使用变化列的旧值，WHERE 使用新值的前缀列
    fn reverse_update_sql(&self, table: &str, set_values: &[ColumnValue], where_values: &[ColumnValue]) -> String {
        if set_values.is_empty() || where_values.is_empty() {
            return String::new();
        }

        let old = first_by_column(where_values);
        let reverted: Vec<(u32, &ScalarValue)> = changed_columns(set_values, where_values)
            .into_iter()
            .filter_map(|v| old.get(&v.column).map(|old_value| (v.column, *old_value)))
            .collect();

        let set_part = if reverted.is_empty() {
            assignments(self.prefix(where_values).iter().map(|v| (v.column, &v.value)))
        } else {
            assignments(reverted.into_iter())
        };

        format!("UPDATE {} SET {} WHERE {};", table, set_part, self.where_clause(set_values))
    }

    fn prefix<'a>(&self, values: &'a [ColumnValue]) -> &'a [ColumnValue] {
        &values[..values.len().min(self.where_prefix_limit)]
    }

    fn where_clause(&self, values: &[ColumnValue]) -> String {
        self.prefix(values)
            .iter()
            .map(|v| format!("{} = {}", v.column_name(), v.value.to_sql_literal()))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn insert_sql(table: &str, values: &[ColumnValue]) -> String {
    if values.is_empty() {
        return String::new();
    }
    let columns = values.iter().map(ColumnValue::column_name).collect::<Vec<_>>().join(", ");
    let literals = values.iter().map(|v| v.value.to_sql_literal()).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {table} ({columns}) VALUES ({literals});")
}

fn assignments<'a, I>(pairs: I) -> String
where
    I: Iterator<Item = (u32, &'a ScalarValue)>,
{
    pairs
        .map(|(column, value)| format!("col_{} = {}", column, value.to_sql_literal()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_by_column(values: &[ColumnValue]) -> HashMap<u32, &ScalarValue> {
    let mut map = HashMap::with_capacity(values.len());
    for v in values {
        map.entry(v.column).or_insert(&v.value);
    }
    map
}

/// SET 中与 WHERE 同列值不同（或 WHERE 中没有该列）的项，保持 SET 中的顺序
fn changed_columns<'a>(set_values: &'a [ColumnValue], where_values: &[ColumnValue]) -> Vec<&'a ColumnValue> {
    let old = first_by_column(where_values);
    set_values
        .iter()
        .filter(|v| old.get(&v.column) != Some(&&v.value))
        .collect()
}
