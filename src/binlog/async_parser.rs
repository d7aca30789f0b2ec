//! 异步 binlog 文本解析模块
//!
//! 基于 tokio 的流式解析：行来自文件或任意 `AsyncBufRead`（例如解码进程的管道），
//! 组装出的记录按块通过无界通道发送。组装本身仍是同步、顺序的。

use crate::binlog::assembler::Assembler;
use crate::binlog::parser::ParseSummary;
use crate::binlog::progress::{LoggingProgress, ProgressReporter};
use crate::binlog::types::ChangeOperation;
use crate::binlog::utils::line_bytes_to_str;
use crate::config::ParserConfig;
use crate::error::{BinlogError, Result};
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// 每处理多少行让出一次控制权
const YIELD_EVERY_LINES: usize = 100;

/// 异步流式解析器
pub struct AsyncBinlogParser;

impl AsyncBinlogParser {
    /// 流式解析文件
    ///
    /// 文件打开失败直接返回错误；之后的解析在后台任务中进行，
    /// 通过返回的接收器获取记录块，通过 `JoinHandle` 获取最终汇总。
    pub async fn parse_with_hooks<P>(
        path: P,
        config: ParserConfig,
    ) -> Result<(UnboundedReceiver<Vec<ChangeOperation>>, JoinHandle<Result<ParseSummary>>)>
    where
        P: AsRef<Path>,
    {
        let path_ref = path.as_ref();
        #[cfg(feature = "logging")]
        tracing::debug!(
            "开始异步流式解析文件: {}, chunk_size = {}",
            path_ref.display(),
            config.chunk_size
        );

        let file = File::open(path_ref).await?;
        Ok(Self::parse_reader(BufReader::new(file), config))
    }

    /// 在后台任务中解析一个异步行来源
    pub fn parse_reader<R>(
        reader: R,
        config: ParserConfig,
    ) -> (UnboundedReceiver<Vec<ChangeOperation>>, JoinHandle<Result<ParseSummary>>)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (record_tx, record_rx) = unbounded_channel::<Vec<ChangeOperation>>();

        let handle = tokio::spawn(async move {
            let result = Self::parse_stream_internal(reader, config, record_tx).await;
            match &result {
                Ok(summary) => tracing::debug!("异步解析完成: {}", summary),
                Err(e) => tracing::error!("异步解析失败: {}", e),
            }
            result
        });

        (record_rx, handle)
    }

    /// 解析并收集全部记录
    pub async fn parse_file<P: AsRef<Path>>(path: P, config: ParserConfig) -> Result<(Vec<ChangeOperation>, ParseSummary)> {
        let (mut rx, handle) = Self::parse_with_hooks(path, config).await?;
        let mut records = Vec::new();
        while let Some(chunk) = rx.recv().await {
            records.extend(chunk);
        }
        let summary = handle
            .await
            .map_err(|e| BinlogError::other(format!("解析任务异常退出: {e}")))??;
        Ok((records, summary))
    }

    async fn parse_stream_internal<R>(
        mut reader: R,
        config: ParserConfig,
        record_tx: UnboundedSender<Vec<ChangeOperation>>,
    ) -> Result<ParseSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let started = Instant::now();
        let mut assembler = Assembler::from_config(&config);
        let mut progress = ProgressReporter::new(
            LoggingProgress,
            config.line_progress_interval,
            config.record_progress_interval,
        );
        let chunk_size = config.chunk_size;
        let mut chunk = Vec::new();
        let mut buf = Vec::new();
        let mut line_num = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_num += 1;

            let line = line_bytes_to_str(&buf, line_num);
            if let Some(op) = assembler.process_line(&line) {
                chunk.push(op);
                progress.records(assembler.stats().emitted);
            }
            progress.lines(line_num);

            let mut should_yield = false;
            if chunk_size > 0 && chunk.len() >= chunk_size {
                if record_tx.send(std::mem::take(&mut chunk)).is_err() {
                    tracing::warn!("记录接收器已关闭，停止解析");
                    return Ok(ParseSummary::from_stats(assembler.stats(), started.elapsed()));
                }
                should_yield = true;
            }

            // 定期让出控制权，保持异步响应性
            if should_yield || line_num % YIELD_EVERY_LINES == 0 {
                tokio::task::yield_now().await;
            }
        }

        if let Some(op) = assembler.finish() {
            chunk.push(op);
        }
        let stats = assembler.stats();
        progress.finish(stats.lines, stats.emitted);

        if !chunk.is_empty() {
            let _ = record_tx.send(chunk);
        }

        Ok(ParseSummary::from_stats(assembler.stats(), started.elapsed()))
    }
}
