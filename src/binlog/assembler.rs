//! 变更记录组装状态机
//!
//! 按顺序消费分类后的行，维护当前打开的记录与 SET/WHERE 分段，
//! 在新语句头、事务边界或流结束时把记录交给 SQL 重建并输出。
//!
//! 状态机本身没有失败路径：异常值由解码器修复，空记录被静默丢弃。

use crate::binlog::classifier::{LineClassifier, LineKind, Section};
use crate::binlog::reconstruct::SqlReconstructor;
use crate::binlog::types::{ChangeKind, ChangeOperation, ColumnValue, EventContext};
use crate::binlog::value::decode_with_repair;
use crate::config::ParserConfig;

/// 组装过程的计数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    pub lines: usize,
    pub emitted: usize,
    /// 没有任何值而被丢弃的记录
    pub discarded: usize,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
    /// 走修复路径的值 token
    pub repaired_values: usize,
    /// UPDATE 在出现 SET/WHERE 之前的值行
    pub dropped_values: usize,
    /// 已输出记录的近似字节数
    pub approx_bytes: usize,
}

/// 单输入流的组装器
///
/// 不同实例之间没有共享状态，可以在多个线程上各自处理独立的输入。
///
/// ```
/// use binlog_analysis::binlog::Assembler;
///
/// let mut assembler = Assembler::new();
/// let mut records = Vec::new();
/// for line in ["### INSERT INTO `d`.`t`", "###   @1=5", "###   @2='x'", "COMMIT/*!*/;"] {
///     records.extend(assembler.process_line(line));
/// }
/// records.extend(assembler.finish());
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].forward_sql, "INSERT INTO `d`.`t` (col_1, col_2) VALUES (5, 'x');");
/// ```
#[derive(Debug, Clone)]
pub struct Assembler {
    classifier: LineClassifier,
    reconstructor: SqlReconstructor,
    context: EventContext,
    current: Option<ChangeOperation>,
    section: Option<Section>,
    stats: AssemblerStats,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self::with_parts(LineClassifier::default(), SqlReconstructor::default())
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::with_parts(
            LineClassifier::new(config.min_unix_timestamp),
            SqlReconstructor::new(config.where_prefix_limit),
        )
    }

    pub fn with_parts(classifier: LineClassifier, reconstructor: SqlReconstructor) -> Self {
        Self {
            classifier,
            reconstructor,
            context: EventContext::default(),
            current: None,
            section: None,
            stats: AssemblerStats::default(),
        }
    }

    /// 当前的事件上下文（下一条新记录会复制它）
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    pub fn stats(&self) -> &AssemblerStats {
        &self.stats
    }

    /// 是否有打开的记录
    pub fn has_open_record(&self) -> bool {
        self.current.is_some()
    }

    /// 处理一行，若该行结束了一条有数据的记录则返回它
    pub fn process_line(&mut self, line: &str) -> Option<ChangeOperation> {
        self.stats.lines += 1;

        match self.classifier.classify(line) {
            LineKind::SetTimestamp { timestamp } => {
                if timestamp.is_some() {
                    self.context.timestamp = timestamp;
                }
                None
            }
            LineKind::ServerHeader { server_id, timestamp, xid } => {
                let flushed = self.flush();
                self.context.server_id = Some(server_id);
                if timestamp.is_some() {
                    self.context.timestamp = timestamp;
                }
                if xid.is_some() {
                    self.context.xid = xid;
                }
                flushed
            }
            LineKind::Xid(xid) => {
                self.context.xid = Some(xid);
                None
            }
            LineKind::Gtid(gtid) => {
                self.context.gtid = Some(gtid);
                None
            }
            LineKind::Statement { kind, database, table } => {
                let flushed = self.flush();
                #[cfg(feature = "logging")]
                tracing::trace!("打开新记录: {} `{}`.`{}`", kind, database, table);
                self.current = Some(ChangeOperation::new(kind, database, table, &self.context));
                flushed
            }
            LineKind::Section(section) => {
                self.section = Some(section);
                None
            }
            LineKind::Value { column, raw } => {
                self.push_value(column, raw);
                None
            }
            LineKind::Boundary => self.flush(),
            LineKind::DateHint(timestamp) => {
                if self.context.timestamp.is_none() {
                    self.context.timestamp = Some(timestamp);
                }
                None
            }
            LineKind::Other => None,
        }
    }

    /// 流结束：输出仍打开的记录（依然要求至少有一个值）
    pub fn finish(&mut self) -> Option<ChangeOperation> {
        let flushed = self.flush();
        #[cfg(feature = "logging")]
        tracing::debug!(
            "组装结束: {} 行, 输出 {} 条, 丢弃 {} 条",
            self.stats.lines,
            self.stats.emitted,
            self.stats.discarded
        );
        flushed
    }

    fn push_value(&mut self, column: u32, raw: &str) {
        let Some(op) = self.current.as_mut() else {
            return;
        };

        let (value, repair) = decode_with_repair(raw);
        if let Some(_repair) = repair {
            self.stats.repaired_values += 1;
            #[cfg(feature = "logging")]
            tracing::warn!(
                "第 {} 行的值 @{} 已修复 ({:?}): {}",
                self.stats.lines,
                column,
                _repair,
                raw
            );
        }

        let value = ColumnValue::new(column, value);
        match (op.kind, self.section) {
            (ChangeKind::Insert | ChangeKind::Delete, _) => op.values.push(value),
            (ChangeKind::Update, Some(Section::Set)) => op.set_values.push(value),
            (ChangeKind::Update, Some(Section::Where)) => op.where_values.push(value),
            (ChangeKind::Update, None) => self.stats.dropped_values += 1,
        }
    }

    fn flush(&mut self) -> Option<ChangeOperation> {
        self.section = None;
        let mut op = self.current.take()?;

        if !op.has_data() {
            self.stats.discarded += 1;
            #[cfg(feature = "logging")]
            tracing::trace!("丢弃空记录: {} {}", op.kind, op.qualified_table());
            return None;
        }

        self.reconstructor.apply(&mut op);

        self.stats.emitted += 1;
        self.stats.approx_bytes += op.approx_size();
        match op.kind {
            ChangeKind::Insert => self.stats.inserts += 1,
            ChangeKind::Update => self.stats.updates += 1,
            ChangeKind::Delete => self.stats.deletes += 1,
        }

        #[cfg(feature = "logging")]
        tracing::trace!("输出记录 #{}: {}", self.stats.emitted, op.forward_sql);

        Some(op)
    }
}
