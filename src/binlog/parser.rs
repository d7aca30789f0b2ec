//! 行迭代器 → 记录迭代器
//!
//! [`BinlogParser`] 包装任意有序的行迭代器，按需拉取行并输出完成的
//! [`ChangeOperation`]。调用方停止迭代即可取消，解析器不持有需要释放的外部资源。
//!
//! ```
//! use binlog_analysis::binlog::{BinlogParser, ChangeKind};
//!
//! let dump = [
//!     "BEGIN",
//!     "### UPDATE `shop`.`orders`",
//!     "### WHERE",
//!     "###   @1=1",
//!     "### SET",
//!     "###   @1=2",
//!     "COMMIT/*!*/;",
//! ];
//!
//! let mut parser = BinlogParser::new(dump);
//! let records: Vec<_> = parser.by_ref().collect();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].kind, ChangeKind::Update);
//! assert_eq!(records[0].reverse_sql, "UPDATE `shop`.`orders` SET col_1 = 1 WHERE col_1 = 2;");
//! assert_eq!(parser.summary().lines_processed, 7);
//! ```

use crate::binlog::assembler::{Assembler, AssemblerStats};
use crate::binlog::progress::{NoProgress, ProgressReporter, ProgressSink};
use crate::binlog::types::ChangeOperation;
use crate::config::ParserConfig;
use std::fmt;
use std::time::{Duration, Instant};

/// 一次解析的最终汇总（仅供观察，不影响解析结果）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub lines_processed: usize,
    pub records_emitted: usize,
    pub records_discarded: usize,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
    pub repaired_values: usize,
    pub elapsed: Duration,
    /// 已输出记录的近似字节数
    pub approx_bytes: usize,
}

impl ParseSummary {
    pub(crate) fn from_stats(stats: &AssemblerStats, elapsed: Duration) -> Self {
        Self {
            lines_processed: stats.lines,
            records_emitted: stats.emitted,
            records_discarded: stats.discarded,
            inserts: stats.inserts,
            updates: stats.updates,
            deletes: stats.deletes,
            repaired_values: stats.repaired_values,
            elapsed,
            approx_bytes: stats.approx_bytes,
        }
    }

    /// 合并另一份汇总（多输入并发解析时使用），耗时取较大者
    pub fn merge(&mut self, other: &ParseSummary) {
        self.lines_processed += other.lines_processed;
        self.records_emitted += other.records_emitted;
        self.records_discarded += other.records_discarded;
        self.inserts += other.inserts;
        self.updates += other.updates;
        self.deletes += other.deletes;
        self.repaired_values += other.repaired_values;
        self.elapsed = self.elapsed.max(other.elapsed);
        self.approx_bytes += other.approx_bytes;
    }
}

impl fmt::Display for ParseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "处理 {} 行, 输出 {} 条记录 (INSERT {}, UPDATE {}, DELETE {}), 丢弃 {} 条空记录, 修复 {} 个值, 约 {} 字节, 耗时 {:?}",
            self.lines_processed,
            self.records_emitted,
            self.inserts,
            self.updates,
            self.deletes,
            self.records_discarded,
            self.repaired_values,
            self.approx_bytes,
            self.elapsed
        )
    }
}

/// 流式解析器
pub struct BinlogParser<I, P = NoProgress> {
    lines: I,
    assembler: Assembler,
    progress: ProgressReporter<P>,
    started: Option<Instant>,
    elapsed: Duration,
    finished: bool,
}

impl<I, S> BinlogParser<I, NoProgress>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    /// 使用默认参数创建解析器
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I, Item = S>,
    {
        Self::with_config(lines, &ParserConfig::default())
    }

    pub fn with_config<T>(lines: T, config: &ParserConfig) -> Self
    where
        T: IntoIterator<IntoIter = I, Item = S>,
    {
        Self {
            lines: lines.into_iter(),
            assembler: Assembler::from_config(config),
            progress: ProgressReporter::new(
                NoProgress,
                config.line_progress_interval,
                config.record_progress_interval,
            ),
            started: None,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }
}

impl<I, S, P> BinlogParser<I, P>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
    P: ProgressSink,
{
    /// 替换进度接收方，保留已配置的上报间隔
    pub fn with_progress<Q: ProgressSink>(self, sink: Q) -> BinlogParser<I, Q> {
        let BinlogParser { lines, assembler, progress, started, elapsed, finished } = self;
        let total = progress.total_lines();
        let (line_interval, record_interval) = progress.intervals();
        let mut progress = ProgressReporter::new(sink, line_interval, record_interval);
        progress.set_total_lines(total);
        BinlogParser { lines, assembler, progress, started, elapsed, finished }
    }

    /// 调用方已知的总行数，会出现在行进度通知里
    pub fn total_lines(mut self, total: usize) -> Self {
        self.progress.set_total_lines(Some(total));
        self
    }

    pub fn stats(&self) -> &AssemblerStats {
        self.assembler.stats()
    }

    /// 当前汇总；迭代结束后即为最终结果
    pub fn summary(&self) -> ParseSummary {
        let elapsed = match (self.finished, self.started) {
            (false, Some(started)) => started.elapsed(),
            _ => self.elapsed,
        };
        ParseSummary::from_stats(self.assembler.stats(), elapsed)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn on_emitted(&mut self) {
        self.progress.records(self.assembler.stats().emitted);
    }

    fn finish(&mut self) -> Option<ChangeOperation> {
        self.finished = true;
        let last = self.assembler.finish();
        let stats = self.assembler.stats();
        self.progress.finish(stats.lines, stats.emitted);
        self.elapsed = self.started.map_or(Duration::ZERO, |s| s.elapsed());

        #[cfg(feature = "logging")]
        tracing::info!("解析完成: {}", self.summary());

        last
    }
}

impl<I, S, P> Iterator for BinlogParser<I, P>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
    P: ProgressSink,
{
    type Item = ChangeOperation;

    fn next(&mut self) -> Option<ChangeOperation> {
        if self.finished {
            return None;
        }

        if self.started.is_none() {
            self.started = Some(Instant::now());
            #[cfg(feature = "logging")]
            tracing::debug!("开始解析行流");
        }

        loop {
            let Some(line) = self.lines.next() else {
                return self.finish();
            };

            let out = self.assembler.process_line(line.as_ref());
            self.progress.lines(self.assembler.stats().lines);

            if let Some(op) = out {
                self.on_emitted();
                return Some(op);
            }
        }
    }
}

/// 解析一段完整文本
pub fn parse_str(text: &str) -> (Vec<ChangeOperation>, ParseSummary) {
    parse_lines_with_config(text.lines(), &ParserConfig::default())
}

/// 解析任意行序列
pub fn parse_lines<T, S>(lines: T) -> Vec<ChangeOperation>
where
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BinlogParser::new(lines).collect()
}

/// 解析任意行序列，返回全部记录与汇总
pub fn parse_lines_with_config<T, S>(lines: T, config: &ParserConfig) -> (Vec<ChangeOperation>, ParseSummary)
where
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = BinlogParser::with_config(lines, config);
    let records: Vec<ChangeOperation> = parser.by_ref().collect();
    (records, parser.summary())
}
