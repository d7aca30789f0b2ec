//! SQL 脚本导出器
//!
//! 正向脚本按出现顺序流式写出；回滚脚本需要倒序，缓存到 `finalize` 时一次写出。

use super::SyncExporter;
use crate::binlog::ChangeOperation;
use crate::error::Result;
use crate::exporter::ExportStats;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 脚本类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// 重放变更
    Forward,
    /// 撤销变更，语句倒序
    Rollback,
}

/// 同步 SQL 脚本导出器
pub struct SyncSqlScriptExporter {
    writer: BufWriter<std::fs::File>,
    kind: ScriptKind,
    pending: Vec<String>,
    stats: ExportStats,
}

impl SyncSqlScriptExporter {
    pub fn new<P: AsRef<Path>>(path: P, kind: ScriptKind) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self { writer: BufWriter::new(file), kind, pending: Vec::new(), stats: ExportStats::new() })
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    fn write_line(&mut self, statement: &str) -> Result<()> {
        self.writer.write_all(statement.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.stats.bytes_written += statement.len() + 1;
        Ok(())
    }
}

impl SyncExporter for SyncSqlScriptExporter {
    fn name(&self) -> &str {
        match self.kind {
            ScriptKind::Forward => "SQL",
            ScriptKind::Rollback => "ROLLBACK-SQL",
        }
    }

    fn export_record(&mut self, record: &ChangeOperation) -> Result<()> {
        let statement = match self.kind {
            ScriptKind::Forward => &record.forward_sql,
            ScriptKind::Rollback => &record.reverse_sql,
        };

        if statement.is_empty() {
            self.stats.skipped_records += 1;
            return Ok(());
        }

        match self.kind {
            ScriptKind::Forward => self.write_line(&record.forward_sql)?,
            ScriptKind::Rollback => self.pending.push(record.reverse_sql.clone()),
        }
        self.stats.exported_records += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for statement in pending.iter().rev() {
            self.write_line(statement)?;
        }
        self.writer.flush()?;
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("{} 脚本导出完成: {}", self.name(), self.stats);

        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binlog::parse_str;
    use std::fs;
    use tempfile::NamedTempFile;

    const DUMP: &str = "### INSERT INTO `d`.`t`\n###   @1=1\n### UPDATE `d`.`t`\n### SET\n###   @1=2\n### DELETE FROM `d`.`t`\n###   @1=3\n";

    #[test]
    fn test_forward_script_in_order() {
        let (records, _) = parse_str(DUMP);
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = SyncSqlScriptExporter::new(tmp.path(), ScriptKind::Forward).unwrap();
        exporter.export_batch(&records).unwrap();
        exporter.finalize().unwrap();

        assert_eq!(
            fs::read_to_string(tmp.path()).unwrap(),
            "INSERT INTO `d`.`t` (col_1) VALUES (1);\nUPDATE `d`.`t` SET col_1 = 2 WHERE 1=1;\nDELETE FROM `d`.`t` WHERE col_1 = 3;\n"
        );
    }

    #[test]
    fn test_rollback_script_reversed_and_skips_empty() {
        let (records, _) = parse_str(DUMP);
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = SyncSqlScriptExporter::new(tmp.path(), ScriptKind::Rollback).unwrap();
        exporter.export_batch(&records).unwrap();
        exporter.finalize().unwrap();

        // UPDATE 没有 WHERE 镜像，没有回滚语句
        assert_eq!(
            fs::read_to_string(tmp.path()).unwrap(),
            "INSERT INTO `d`.`t` (col_1) VALUES (3);\nDELETE FROM `d`.`t` WHERE col_1 = 1;\n"
        );
        let stats = exporter.get_stats();
        assert_eq!(stats.exported_records, 2);
        assert_eq!(stats.skipped_records, 1);
        assert_eq!(exporter.name(), "ROLLBACK-SQL");
    }
}
