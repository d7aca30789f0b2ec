//! 多文件并发解析的集成测试

mod common;

#[cfg(test)]
mod concurrent_parser_tests {
    use super::common::*;
    use binlog_analysis::binlog::{ChangeOperation, ConcurrentParser, SyncBinlogParser};
    use binlog_analysis::config::ParserConfig;
    use binlog_analysis::error::Result;
    use binlog_analysis::exporter::SyncExporter;
    use tempfile::TempDir;

    /// 记录导出顺序的内存导出器
    #[derive(Default)]
    struct CollectingExporter {
        tables: Vec<String>,
        finalized: bool,
    }

    impl SyncExporter for CollectingExporter {
        fn name(&self) -> &str {
            "COLLECT"
        }

        fn export_record(&mut self, record: &ChangeOperation) -> Result<()> {
            self.tables.push(record.table.clone());
            Ok(())
        }

        fn finalize(&mut self) -> Result<()> {
            self.finalized = true;
            Ok(())
        }
    }

    #[test]
    fn test_matches_sequential_parse() {
        let dir = TempDir::new().unwrap();
        let paths = create_multiple_test_files(&dir, 6);
        let config = ParserConfig { thread_count: 3, ..ParserConfig::default() };

        let results = ConcurrentParser::new(config.clone()).parse_files(&paths);
        assert_eq!(results.len(), 6);

        for (path, result) in paths.iter().zip(&results) {
            let result = result.as_ref().unwrap();
            let (expected, _) = SyncBinlogParser::parse_file(path, &config).unwrap();
            assert_eq!(&result.path, path);
            assert_eq!(result.records, expected);
        }
    }

    #[test]
    fn test_parse_and_export_in_input_order() {
        let dir = TempDir::new().unwrap();
        let mut paths = create_multiple_test_files(&dir, 4);
        paths.insert(1, dir.path().join("missing.txt"));

        let parser = ConcurrentParser::new(ParserConfig { thread_count: 4, ..ParserConfig::default() });
        let mut exporter = CollectingExporter::default();
        let summary = parser.parse_and_export(&paths, &mut exporter).unwrap();

        // 文件 i 有 i + 1 条记录，缺失文件被跳过
        assert_eq!(summary.records_emitted, 1 + 2 + 3 + 4);
        assert!(exporter.finalized);

        let mut expected = Vec::new();
        for i in 0..4 {
            expected.extend(std::iter::repeat_n(format!("t{i}"), i + 1));
        }
        assert_eq!(exporter.tables, expected);
    }

    #[test]
    fn test_more_threads_than_files() {
        let dir = TempDir::new().unwrap();
        let paths = create_multiple_test_files(&dir, 2);
        let parser = ConcurrentParser::new(ParserConfig { thread_count: 16, ..ParserConfig::default() });
        assert!(parser.parse_files(&paths).iter().all(|r| r.is_ok()));
        assert_eq!(parser.config().thread_count, 16);
    }
}
