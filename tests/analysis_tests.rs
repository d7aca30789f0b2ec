//! 记录查询与统计的集成测试

mod common;

#[cfg(test)]
mod analysis_tests {
    use super::common::*;
    use binlog_analysis::analysis::{
        FilterOptions, OperationFilter, OperationQuery, SortKey, SortOrder, Statistics, rollback_script, time_range,
    };
    use binlog_analysis::binlog::{ChangeKind, ChangeOperation, parse_str};

    fn all_records() -> Vec<ChangeOperation> {
        let mut records = parse_str(SAMPLE_DUMP).0;
        records.extend(parse_str(MULTI_TRANSACTION_DUMP).0);
        records
    }

    #[test]
    fn test_query_by_table_and_kind() {
        let records = all_records();
        let query = OperationQuery {
            filter: OperationFilter::new().database("crm").kind(ChangeKind::Update),
            sort_by: SortKey::Position,
            order: SortOrder::Asc,
            ..OperationQuery::default()
        };
        let page = query.run(&records);
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].forward_sql, records[4].forward_sql);
    }

    #[test]
    fn test_query_time_window_and_paging() {
        let records = all_records();
        let query = OperationQuery {
            filter: OperationFilter::new().start_time("2024-12-01 10:31:05").end_time("2024-12-01 12:00:00"),
            page: 2,
            page_size: 2,
            ..OperationQuery::default()
        };
        let page = query.run(&records);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].timestamp.as_deref(), Some("2024-12-01 10:31:05"));
    }

    #[test]
    fn test_statistics_and_ranges() {
        let records = all_records();
        let stats = Statistics::from_records(&records);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.by_kind["UPDATE"], 3);
        assert_eq!(stats.by_table["shop.orders"], 3);
        assert_eq!(stats.by_hour["12"], 2);

        assert_eq!(
            time_range(&records),
            Some(("2024-12-01 10:30:20".to_string(), "2024-12-01 12:15:30".to_string()))
        );

        let options = FilterOptions::from_records(&records);
        assert_eq!(options.databases, vec!["crm", "shop"]);
        assert_eq!(options.tables, vec!["leads", "orders"]);
    }

    #[test]
    fn test_rollback_script_undoes_in_reverse() {
        let records = parse_str(SAMPLE_DUMP).0;
        let script = rollback_script(&records);
        let expected: Vec<&str> = records.iter().rev().map(|op| op.reverse_sql.as_str()).collect();
        assert_eq!(script.lines().collect::<Vec<_>>(), expected);
        assert!(script.ends_with(";\n"));
    }
}
