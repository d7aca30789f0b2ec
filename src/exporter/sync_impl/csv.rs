//! CSV 导出器实现 (同步版本)

use super::SyncExporter;
use crate::binlog::ChangeOperation;
use crate::error::Result;
use crate::exporter::ExportStats;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "kind,database,table,timestamp,server_id,xid,gtid,forward_sql,reverse_sql\n";

/// 同步 CSV 导出器，每条变更一行
pub struct SyncCsvExporter {
    writer: BufWriter<std::fs::File>,
    stats: ExportStats,
    header_written: bool,
}

impl SyncCsvExporter {
    /// 创建新的同步 CSV 导出器（覆盖已有文件）
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);

        Ok(Self { writer, stats: ExportStats::new(), header_written: false })
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer.write_all(HEADER.as_bytes())?;
        self.stats.bytes_written += HEADER.len();
        self.header_written = true;
        Ok(())
    }

    /// 转义 CSV 字段
    fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn optional(field: &Option<String>) -> String {
        field.as_deref().map(Self::escape_csv_field).unwrap_or_default()
    }

    /// 格式化记录为 CSV 行
    fn format_record(record: &ChangeOperation) -> String {
        let fields = [
            record.kind.as_str().to_string(),
            Self::escape_csv_field(&record.database),
            Self::escape_csv_field(&record.table),
            Self::optional(&record.timestamp),
            Self::optional(&record.server_id),
            Self::optional(&record.xid),
            Self::optional(&record.gtid),
            Self::escape_csv_field(&record.forward_sql),
            Self::escape_csv_field(&record.reverse_sql),
        ];

        format!("{}\n", fields.join(","))
    }

    fn write_record(&mut self, record: &ChangeOperation) -> Result<()> {
        let line = Self::format_record(record);
        self.writer.write_all(line.as_bytes())?;
        self.stats.bytes_written += line.len();
        self.stats.exported_records += 1;
        Ok(())
    }
}

impl SyncExporter for SyncCsvExporter {
    fn name(&self) -> &str {
        "CSV"
    }

    fn export_record(&mut self, record: &ChangeOperation) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        self.write_record(record)
    }

    fn export_batch(&mut self, records: &[ChangeOperation]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if !self.header_written {
            self.write_header()?;
        }

        for record in records {
            self.write_record(record)?;
        }

        #[cfg(feature = "logging")]
        tracing::debug!("CSV批量导出: {} 条记录", records.len());

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        // 没有任何记录时也输出表头
        if !self.header_written {
            self.write_header()?;
        }

        self.writer.flush()?;
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("CSV导出完成: {}", self.stats);

        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        self.stats.clone()
    }
}
