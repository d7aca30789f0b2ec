//! JSON 导出器实现 (同步版本)

use super::SyncExporter;
use crate::binlog::ChangeOperation;
use crate::error::Result;
use crate::exporter::ExportStats;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 同步 JSON 导出器，输出一个记录数组
pub struct SyncJsonExporter {
    writer: BufWriter<std::fs::File>,
    stats: ExportStats,
    first_record: bool,
}

impl SyncJsonExporter {
    /// 创建新的同步 JSON 导出器
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);

        // 写入 JSON 数组开始符
        writer.write_all(b"[\n")?;

        let mut stats = ExportStats::new();
        stats.bytes_written = 2;
        Ok(Self { writer, stats, first_record: true })
    }

    fn record_to_json(record: &ChangeOperation) -> Result<String> {
        Ok(serde_json::to_string_pretty(record)?)
    }

    fn write_record(&mut self, record: &ChangeOperation) -> Result<()> {
        if !self.first_record {
            self.writer.write_all(b",\n")?;
            self.stats.bytes_written += 2;
        } else {
            self.first_record = false;
        }

        // 数组元素整体缩进两格
        let indented_json = Self::record_to_json(record)?
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        self.writer.write_all(indented_json.as_bytes())?;
        self.stats.bytes_written += indented_json.len();
        self.stats.exported_records += 1;
        Ok(())
    }
}

impl SyncExporter for SyncJsonExporter {
    fn name(&self) -> &str {
        "JSON"
    }

    fn export_record(&mut self, record: &ChangeOperation) -> Result<()> {
        self.write_record(record)
    }

    fn export_batch(&mut self, records: &[ChangeOperation]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }

        #[cfg(feature = "logging")]
        tracing::debug!("JSON批量导出: {} 条记录", records.len());

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let tail: &[u8] = if self.first_record { b"]\n" } else { b"\n]\n" };
        self.writer.write_all(tail)?;
        self.writer.flush()?;
        self.stats.bytes_written += tail.len();
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("JSON导出完成: {}", self.stats);

        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        self.stats.clone()
    }
}
