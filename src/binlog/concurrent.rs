//! 多文件并发解析
//!
//! 每个文件由一个工作线程独立解析（上下文状态不跨文件），结果按输入顺序返回。

use crate::binlog::parser::ParseSummary;
use crate::binlog::sync_parser::SyncBinlogParser;
use crate::binlog::types::ChangeOperation;
use crate::config::ParserConfig;
use crate::error::{BinlogError, Result};
use crate::exporter::SyncExporter;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// 单个文件的解析结果
#[derive(Debug, Clone)]
pub struct FileParseResult {
    pub path: PathBuf,
    pub records: Vec<ChangeOperation>,
    pub summary: ParseSummary,
}

/// 并发解析器，线程数取自 `ParserConfig::thread_count`
#[derive(Debug, Clone, Default)]
pub struct ConcurrentParser {
    config: ParserConfig,
}

type FileQueue = Arc<Mutex<VecDeque<(usize, PathBuf)>>>;
type ResultSlots = Arc<Mutex<Vec<Option<Result<FileParseResult>>>>>;

/// 工作线程 panic 不影响其他线程继续取用数据
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ConcurrentParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// 并发解析多个文件，返回值与 `paths` 一一对应
    pub fn parse_files(&self, paths: &[PathBuf]) -> Vec<Result<FileParseResult>> {
        if paths.is_empty() {
            return Vec::new();
        }

        let thread_count = self.config.thread_count.clamp(1, paths.len());

        #[cfg(feature = "logging")]
        tracing::info!("开始并发解析 {} 个文件，线程数: {}", paths.len(), thread_count);

        let queue: FileQueue = Arc::new(Mutex::new(paths.iter().cloned().enumerate().collect()));
        let slots: ResultSlots = Arc::new(Mutex::new((0..paths.len()).map(|_| None).collect()));

        let handles: Vec<_> = (0..thread_count)
            .map(|_worker_id| {
                let queue = Arc::clone(&queue);
                let slots = Arc::clone(&slots);
                let config = self.config.clone();

                thread::spawn(move || {
                    loop {
                        let Some((index, path)) = lock(&queue).pop_front() else {
                            break;
                        };

                        #[cfg(feature = "logging")]
                        tracing::debug!("线程 {} 开始解析: {}", _worker_id, path.display());

                        let result = SyncBinlogParser::parse_file(&path, &config)
                            .map(|(records, summary)| FileParseResult { path, records, summary });

                        lock(&slots)[index] = Some(result);
                    }
                })
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                #[cfg(feature = "logging")]
                tracing::error!("解析线程异常退出");
            }
        }

        let slots = std::mem::take(&mut *lock(&slots));
        slots
            .into_iter()
            .zip(paths)
            .map(|(slot, path)| {
                slot.unwrap_or_else(|| Err(BinlogError::other(format!("文件 {} 未被解析", path.display()))))
            })
            .collect()
    }

    /// 并发解析后按输入顺序导出
    ///
    /// 解析失败的文件被跳过并记录日志，导出器最后统一 `finalize`。
    /// 返回所有成功文件的合并摘要。
    pub fn parse_and_export<E: SyncExporter>(&self, paths: &[PathBuf], exporter: &mut E) -> Result<ParseSummary> {
        let mut total = ParseSummary::default();

        for result in self.parse_files(paths) {
            match result {
                Ok(file) => {
                    exporter.export_batch(&file.records)?;
                    total.merge(&file.summary);
                }
                Err(_e) => {
                    #[cfg(feature = "logging")]
                    tracing::error!("解析文件失败: {}", _e);
                }
            }
        }

        exporter.finalize()?;

        #[cfg(feature = "logging")]
        tracing::info!("并发解析导出完成: {}", total);

        Ok(total)
    }
}
