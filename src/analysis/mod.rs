//! 变更记录分析
//!
//! 对已解析的记录做过滤、排序、分页、统计，并生成回滚脚本。
//! 这里只处理内存中的记录，存储与展示由调用方负责。

pub mod query;
pub mod stats;

pub use query::{OperationFilter, OperationQuery, Page, SortKey, SortOrder, paginate, sort_operations};
pub use stats::{FilterOptions, Statistics, rollback_script, time_range};
