//! 进度上报
//!
//! 进度只是旁路通知：接收方的任何行为都不会影响解析结果。

/// 默认每处理多少行上报一次
pub const DEFAULT_LINE_PROGRESS_INTERVAL: usize = 1000;

/// 默认每输出多少条记录上报一次
pub const DEFAULT_RECORD_PROGRESS_INTERVAL: usize = 100;

/// 一次进度通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// 已处理行数，以及调用方预先告知的总行数
    Lines { processed: usize, total: Option<usize> },
    /// 已输出记录数
    Records { emitted: usize },
}

/// 进度接收方
///
/// 通知可能被合并或丢失，接收方只能把它当作参考值。
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

/// 不做任何事的接收方
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// 把进度写到 tracing 的接收方
#[cfg(feature = "logging")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProgress;

#[cfg(feature = "logging")]
impl ProgressSink for LoggingProgress {
    fn on_progress(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Lines { processed, total: Some(total) } => {
                tracing::debug!("解析进度: {}/{} 行", processed, total);
            }
            ProgressEvent::Lines { processed, total: None } => {
                tracing::debug!("解析进度: {} 行", processed);
            }
            ProgressEvent::Records { emitted } => {
                tracing::debug!("已输出 {} 条变更记录", emitted);
            }
        }
    }
}

/// 按固定间隔把计数转发给接收方
#[derive(Debug)]
pub struct ProgressReporter<P> {
    sink: P,
    line_interval: usize,
    record_interval: usize,
    total_lines: Option<usize>,
    last_lines: usize,
    last_records: usize,
}

impl<P: ProgressSink> ProgressReporter<P> {
    /// 间隔为 0 时按 1 处理
    pub fn new(sink: P, line_interval: usize, record_interval: usize) -> Self {
        Self {
            sink,
            line_interval: line_interval.max(1),
            record_interval: record_interval.max(1),
            total_lines: None,
            last_lines: 0,
            last_records: 0,
        }
    }

    pub fn with_defaults(sink: P) -> Self {
        Self::new(sink, DEFAULT_LINE_PROGRESS_INTERVAL, DEFAULT_RECORD_PROGRESS_INTERVAL)
    }

    /// 设置调用方已知的总行数
    pub fn set_total_lines(&mut self, total: Option<usize>) {
        self.total_lines = total;
    }

    pub fn total_lines(&self) -> Option<usize> {
        self.total_lines
    }

    /// `(行间隔, 记录间隔)`
    pub fn intervals(&self) -> (usize, usize) {
        (self.line_interval, self.record_interval)
    }

    pub fn lines(&mut self, processed: usize) {
        if processed > self.last_lines && processed % self.line_interval == 0 {
            self.last_lines = processed;
            self.sink.on_progress(ProgressEvent::Lines { processed, total: self.total_lines });
        }
    }

    pub fn records(&mut self, emitted: usize) {
        if emitted > self.last_records && emitted % self.record_interval == 0 {
            self.last_records = emitted;
            self.sink.on_progress(ProgressEvent::Records { emitted });
        }
    }

    /// 流结束时补发最后一次计数（与上一次相同则不重复发送）
    pub fn finish(&mut self, processed: usize, emitted: usize) {
        if processed > self.last_lines {
            self.last_lines = processed;
            self.sink.on_progress(ProgressEvent::Lines { processed, total: self.total_lines });
        }
        if emitted > self.last_records {
            self.last_records = emitted;
            self.sink.on_progress(ProgressEvent::Records { emitted });
        }
    }

    pub fn into_sink(self) -> P {
        self.sink
    }
}
