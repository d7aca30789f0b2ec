//! 导出统计信息模块

use std::time::{Duration, Instant};

/// 单个导出器的统计信息
#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    /// 已导出的记录数
    pub exported_records: usize,
    /// 导出失败的记录数
    pub failed_records: usize,
    /// 跳过的记录数（例如回滚脚本中没有回滚语句的记录）
    pub skipped_records: usize,
    /// 写出的字节数
    pub bytes_written: usize,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
}

impl ExportStats {
    /// 创建新的统计信息，记录开始时间
    pub fn new() -> Self {
        Self { start_time: Some(Instant::now()), ..Default::default() }
    }

    /// 标记导出完成
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// 每秒导出记录数
    pub fn records_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            if d.as_secs_f64() > 0.0 {
                self.exported_records as f64 / d.as_secs_f64()
            } else {
                0.0
            }
        })
    }

    /// 成功率（百分比），跳过的记录不计入
    pub fn success_rate(&self) -> f64 {
        let total = self.exported_records + self.failed_records;
        if total > 0 {
            self.exported_records as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn total_records(&self) -> usize {
        self.exported_records + self.failed_records + self.skipped_records
    }

    /// 合并其他统计信息，保留最早的开始时间与最晚的结束时间
    pub fn merge(&mut self, other: &ExportStats) {
        self.exported_records += other.exported_records;
        self.failed_records += other.failed_records;
        self.skipped_records += other.skipped_records;
        self.bytes_written += other.bytes_written;

        self.start_time = match (self.start_time, other.start_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.end_time = match (self.end_time, other.end_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

impl std::fmt::Display for ExportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "成功: {}, 失败: {}, 跳过: {}, 写出: {} 字节",
            self.exported_records, self.failed_records, self.skipped_records, self.bytes_written
        )?;

        if let Some(duration) = self.duration() {
            write!(f, ", 耗时: {:.2}s", duration.as_secs_f64())?;

            if let Some(rps) = self.records_per_second() {
                write!(f, ", 速度: {:.2} 记录/秒", rps)?;
            }
        }

        write!(f, ", 成功率: {:.1}%", self.success_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_finish() {
        let s = ExportStats::new().to_string();
        assert!(s.contains("成功: 0"));
        assert!(!s.contains("耗时"));
    }

    #[test]
    fn test_records_per_second_zero_duration() {
        let mut stats = ExportStats::new();
        stats.exported_records = 1;
        stats.end_time = stats.start_time;
        assert_eq!(stats.records_per_second(), Some(0.0));
    }

    #[test]
    fn test_merge_keeps_widest_window() {
        let now = Instant::now();
        let mut a = ExportStats {
            exported_records: 2,
            bytes_written: 10,
            start_time: Some(now),
            end_time: Some(now + Duration::from_secs(1)),
            ..Default::default()
        };
        let b = ExportStats {
            exported_records: 3,
            skipped_records: 1,
            bytes_written: 5,
            start_time: now.checked_sub(Duration::from_secs(2)),
            end_time: Some(now + Duration::from_secs(5)),
            ..Default::default()
        };

        a.merge(&b);
        assert_eq!(a.exported_records, 5);
        assert_eq!(a.skipped_records, 1);
        assert_eq!(a.bytes_written, 15);
        assert_eq!(a.start_time, b.start_time.or(Some(now)).map(|t| t.min(now)));
        assert_eq!(a.end_time, Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_success_rate() {
        let mut stats = ExportStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        stats.exported_records = 3;
        stats.failed_records = 1;
        stats.skipped_records = 4;
        assert!((stats.success_rate() - 75.0).abs() < 1e-6);
        assert_eq!(stats.total_records(), 8);
    }
}
