//! 同步导出器实现
//!
//! 导出器只接收已完成的记录，不参与解析；单个导出器失败不影响解析结果。

use crate::binlog::ChangeOperation;
use crate::error::Result;
use crate::exporter::ExportStats;

/// 变更记录的同步输出端
pub trait SyncExporter: Send + Sync {
    /// 用于日志和统计报告的名称
    fn name(&self) -> &str;

    fn export_record(&mut self, record: &ChangeOperation) -> Result<()>;

    /// 按顺序导出一块记录（文件驱动的分块回调直接调用这里）
    fn export_batch(&mut self, records: &[ChangeOperation]) -> Result<()> {
        records.iter().try_for_each(|record| self.export_record(record))
    }

    /// 边解析边导出，返回导出的记录数
    ///
    /// `records` 通常是一个 [`BinlogParser`](crate::binlog::BinlogParser)，
    /// 不需要先把全部记录收集到内存。完成后不会自动调用 `finalize`。
    fn export_stream<I>(&mut self, records: I) -> Result<usize>
    where
        Self: Sized,
        I: IntoIterator<Item = ChangeOperation>,
    {
        let mut count = 0;
        for record in records {
            self.export_record(&record)?;
            count += 1;
        }
        Ok(count)
    }

    /// 刷新缓冲并写出尾部内容
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        ExportStats::default()
    }
}

#[cfg(feature = "exporter-csv")]
pub mod csv;
#[cfg(feature = "exporter-json")]
pub mod json;
pub mod multi_exporter;
pub mod sql_script;

#[cfg(feature = "exporter-csv")]
pub use csv::SyncCsvExporter;
#[cfg(feature = "exporter-json")]
pub use json::SyncJsonExporter;
pub use multi_exporter::SyncMultiExporter;
pub use sql_script::{ScriptKind, SyncSqlScriptExporter};
