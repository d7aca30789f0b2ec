//! 数据导出模块
//!
//! 提供统一的导出接口：JSON、CSV 以及正向/回滚 SQL 脚本

pub mod stats;
pub use stats::ExportStats;

pub mod sync_impl;

#[cfg(feature = "exporter-csv")]
pub use sync_impl::SyncCsvExporter;
#[cfg(feature = "exporter-json")]
pub use sync_impl::SyncJsonExporter;
pub use sync_impl::{ScriptKind, SyncExporter, SyncMultiExporter, SyncSqlScriptExporter};

#[cfg(feature = "exporter-csv")]
pub use sync_impl::SyncCsvExporter as CsvExporter;
#[cfg(feature = "exporter-json")]
pub use sync_impl::SyncJsonExporter as JsonExporter;
pub use sync_impl::SyncMultiExporter as MultiExporter;
pub use sync_impl::SyncSqlScriptExporter as SqlScriptExporter;

use crate::config::ExportConfig;
use crate::error::Result;

/// 按导出配置创建多导出器，未配置的输出被跳过
///
/// 对应 feature 未启用时配置的输出路径会被忽略并记录警告。
pub fn build_from_config(config: &ExportConfig) -> Result<SyncMultiExporter> {
    let mut multi = SyncMultiExporter::new();

    if let Some(_path) = &config.json {
        #[cfg(feature = "exporter-json")]
        multi.add_exporter(SyncJsonExporter::new(_path)?);
        #[cfg(all(not(feature = "exporter-json"), feature = "logging"))]
        tracing::warn!("未启用 exporter-json，忽略 JSON 输出: {}", _path);
    }

    if let Some(_path) = &config.csv {
        #[cfg(feature = "exporter-csv")]
        multi.add_exporter(SyncCsvExporter::new(_path)?);
        #[cfg(all(not(feature = "exporter-csv"), feature = "logging"))]
        tracing::warn!("未启用 exporter-csv，忽略 CSV 输出: {}", _path);
    }

    if let Some(path) = &config.rollback_sql {
        multi.add_exporter(SyncSqlScriptExporter::new(path, ScriptKind::Rollback)?);
    }

    #[cfg(feature = "logging")]
    tracing::debug!("根据配置创建了 {} 个导出器", multi.len());

    Ok(multi)
}
