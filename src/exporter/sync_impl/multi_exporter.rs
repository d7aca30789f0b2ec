//! 同步多导出器管理模块

use super::SyncExporter;
use crate::binlog::ChangeOperation;
use crate::error::{BinlogError, Result};
use crate::exporter::ExportStats;

/// 把同一批记录分发给多个导出器
///
/// 单个导出器失败计入它自己的失败数，其他导出器照常写入，调用方拿到汇总后的错误。
pub struct SyncMultiExporter {
    exporters: Vec<Box<dyn SyncExporter>>,
    stats: Vec<ExportStats>,
}

impl SyncMultiExporter {
    pub fn new() -> Self {
        Self { exporters: Vec::new(), stats: Vec::new() }
    }

    /// 添加导出器
    pub fn add_exporter<E>(&mut self, exporter: E)
    where
        E: SyncExporter + 'static,
    {
        self.exporters.push(Box::new(exporter));
        self.stats.push(ExportStats::new());
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// 导出单条记录到所有导出器
    ///
    /// 每个导出器都会收到这条记录；任一导出器失败时返回错误，错误信息列出失败的导出器。
    pub fn export_record(&mut self, record: &ChangeOperation) -> Result<()> {
        let mut failed = Vec::new();
        for (exporter, stats) in self.exporters.iter_mut().zip(self.stats.iter_mut()) {
            match exporter.export_record(record) {
                Ok(()) => stats.exported_records += 1,
                Err(e) => {
                    stats.failed_records += 1;
                    #[cfg(feature = "logging")]
                    tracing::warn!("导出器 {} 写入记录失败: {}", exporter.name(), e);
                    failed.push(format!("{}: {}", exporter.name(), e));
                }
            }
        }
        failures_to_result("写入记录", failed)
    }

    /// 批量导出到所有导出器
    pub fn export_batch(&mut self, records: &[ChangeOperation]) -> Result<()> {
        for record in records {
            self.export_record(record)?;
        }
        Ok(())
    }

    /// 完成所有导出器
    ///
    /// 先让每个导出器都完成，再汇总失败；回滚脚本这类只在完成时落盘的导出器写失败也会报错。
    pub fn finalize_all(&mut self) -> Result<()> {
        let mut failed = Vec::new();
        for (exporter, stats) in self.exporters.iter_mut().zip(self.stats.iter_mut()) {
            match exporter.finalize() {
                Ok(()) => {
                    let own = exporter.get_stats();
                    stats.skipped_records = own.skipped_records;
                    stats.bytes_written = own.bytes_written;
                    stats.finish();
                }
                Err(e) => {
                    stats.failed_records += 1;
                    #[cfg(feature = "logging")]
                    tracing::error!("导出器 {} 完成失败: {}", exporter.name(), e);
                    failed.push(format!("{}: {}", exporter.name(), e));
                }
            }
        }
        failures_to_result("完成", failed)
    }

    /// 获取所有导出器的统计信息
    pub fn get_all_stats(&self) -> Vec<(String, ExportStats)> {
        self.exporters
            .iter()
            .zip(self.stats.iter())
            .map(|(exporter, stats)| (exporter.name().to_string(), stats.clone()))
            .collect()
    }

    /// 统计报告文本
    pub fn stats_report(&self) -> String {
        let mut report = String::from("=== 导出统计报告 ===\n");
        for (name, stats) in self.get_all_stats() {
            report.push_str(&format!("导出器: {name}\n  {stats}\n"));
        }
        report
    }
}

fn failures_to_result(stage: &str, failed: Vec<String>) -> Result<()> {
    if failed.is_empty() {
        Ok(())
    } else {
        Err(BinlogError::other(format!("导出器{stage}失败: {}", failed.join("; "))))
    }
}

impl Default for SyncMultiExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncExporter for SyncMultiExporter {
    fn name(&self) -> &str {
        "MULTI"
    }

    fn export_record(&mut self, record: &ChangeOperation) -> Result<()> {
        SyncMultiExporter::export_record(self, record)
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalize_all()
    }

    fn get_stats(&self) -> ExportStats {
        let mut total = ExportStats::default();
        for stats in &self.stats {
            total.merge(stats);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binlog::{ChangeKind, EventContext};

    struct DummyOk;

    impl SyncExporter for DummyOk {
        fn name(&self) -> &str {
            "OK"
        }
        fn export_record(&mut self, _record: &ChangeOperation) -> Result<()> {
            Ok(())
        }
    }

    struct DummyErr;

    impl SyncExporter for DummyErr {
        fn name(&self) -> &str {
            "ERR"
        }
        fn export_record(&mut self, _record: &ChangeOperation) -> Result<()> {
            Err(BinlogError::Other("fail".into()))
        }
        fn finalize(&mut self) -> Result<()> {
            Err(BinlogError::Other("finalize fail".into()))
        }
    }

    fn record() -> ChangeOperation {
        ChangeOperation::new(ChangeKind::Insert, "d".into(), "t".into(), &EventContext::default())
    }

    #[test]
    fn test_success_and_failure_paths() {
        let mut m = SyncMultiExporter::new();
        m.add_exporter(DummyOk);
        m.add_exporter(DummyErr);
        assert_eq!(m.len(), 2);

        for _ in 0..2 {
            let err = m.export_record(&record()).unwrap_err();
            assert!(err.to_string().contains("ERR"));
        }
        let stats = m.get_all_stats();
        assert_eq!(stats[0].1.exported_records, 2);
        assert_eq!(stats[1].1.failed_records, 2);

        let err = m.finalize_all().unwrap_err();
        assert!(err.is_other_error());
        assert!(err.to_string().contains("ERR: "));
        assert!(!err.to_string().contains("OK: "));
        let stats = m.get_all_stats();
        assert!(stats[0].1.end_time.is_some());
        assert_eq!(stats[1].1.failed_records, 3);

        let report = m.stats_report();
        assert!(report.contains("导出器: OK"));
        assert!(report.contains("导出器: ERR"));
        assert_eq!(SyncExporter::get_stats(&m).exported_records, 2);
    }

    #[test]
    fn test_batch_stops_at_first_failing_record() {
        let mut m = SyncMultiExporter::new();
        m.add_exporter(DummyOk);
        m.add_exporter(DummyErr);

        assert!(m.export_batch(&[record(), record()]).is_err());
        assert_eq!(m.get_all_stats()[0].1.exported_records, 1);
    }

    #[test]
    fn test_all_ok_finalize_succeeds() {
        let mut m = SyncMultiExporter::new();
        m.add_exporter(DummyOk);
        m.export_batch(&[record()]).unwrap();
        m.finalize_all().unwrap();
        assert!(SyncExporter::finalize(&mut m).is_ok());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_rollback_write_failure_surfaces_from_finalize() {
        use crate::exporter::{ScriptKind, SqlScriptExporter};

        let mut m = SyncMultiExporter::new();
        m.add_exporter(DummyOk);
        m.add_exporter(SqlScriptExporter::new("/dev/full", ScriptKind::Rollback).unwrap());

        let mut insert = record();
        insert.reverse_sql = "DELETE FROM `d`.`t` WHERE col_1 = 1;".into();
        m.export_batch(&[insert.clone(), insert]).unwrap();

        let err = m.finalize_all().unwrap_err();
        assert!(err.to_string().contains("ROLLBACK-SQL"));
        let stats = m.get_all_stats();
        assert!(stats[0].1.end_time.is_some());
        assert!(stats[1].1.failed_records > 0);
    }
}

impl std::fmt::Debug for SyncMultiExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncMultiExporter")
            .field("exporters", &self.exporters.len())
            .field("stats", &self.stats)
            .finish()
    }
}
