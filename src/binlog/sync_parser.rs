use crate::binlog::io::{LossyLines, open_lines, sniff_file};
use crate::binlog::parser::{BinlogParser, ParseSummary};
use crate::binlog::progress::{NoProgress, ProgressSink};
use crate::binlog::types::ChangeOperation;
use crate::config::ParserConfig;
use crate::error::{BinlogError, Result};
use std::io::BufRead;
use std::path::Path;

/// 同步文件解析器
pub struct SyncBinlogParser;

impl SyncBinlogParser {
    /// 流式解析文件，按块回调
    ///
    /// # 参数
    /// - `path`: 解码后的 binlog 文本文件
    /// - `config`: 解析配置，`chunk_size` 为每次回调的记录数（0 表示全部解析完后回调一次）
    /// - `hook`: 回调函数，接收一块记录
    pub fn parse_with_hooks<P, F>(path: P, config: &ParserConfig, hook: F) -> Result<ParseSummary>
    where
        P: AsRef<Path>,
        F: FnMut(&[ChangeOperation]),
    {
        Self::parse_with_progress(path, config, NoProgress, hook)
    }

    /// 同 [`parse_with_hooks`](Self::parse_with_hooks)，附带进度接收方
    pub fn parse_with_progress<P, Q, F>(path: P, config: &ParserConfig, progress: Q, hook: F) -> Result<ParseSummary>
    where
        P: AsRef<Path>,
        Q: ProgressSink,
        F: FnMut(&[ChangeOperation]),
    {
        let path_ref = path.as_ref();
        #[cfg(feature = "logging")]
        tracing::debug!(
            "开始流式解析文件: {}, chunk_size = {}",
            path_ref.display(),
            config.chunk_size
        );

        if !sniff_file(path_ref)? {
            #[cfg(feature = "logging")]
            tracing::warn!(
                "文件 {} 看起来不是 mysqlbinlog 解码后的文本，仍按文本解析",
                path_ref.display()
            );
        }

        let summary = Self::drive(open_lines(path_ref)?, config, progress, hook)?;

        #[cfg(feature = "logging")]
        tracing::info!("流式解析文件完成: {}, {}", path_ref.display(), summary);
        Ok(summary)
    }

    /// 解析任意 `BufRead`（例如解码进程的标准输出）
    pub fn parse_reader_with_hooks<R, F>(reader: R, config: &ParserConfig, hook: F) -> Result<ParseSummary>
    where
        R: BufRead,
        F: FnMut(&[ChangeOperation]),
    {
        Self::drive(LossyLines::new(reader), config, NoProgress, hook)
    }

    /// 解析整个文件并收集全部记录
    pub fn parse_file<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<(Vec<ChangeOperation>, ParseSummary)> {
        let mut records = Vec::new();
        let summary = Self::parse_with_hooks(path, config, |chunk| records.extend_from_slice(chunk))?;
        Ok((records, summary))
    }

    fn drive<R, Q, F>(lines: LossyLines<R>, config: &ParserConfig, progress: Q, mut hook: F) -> Result<ParseSummary>
    where
        R: BufRead,
        Q: ProgressSink,
        F: FnMut(&[ChangeOperation]),
    {
        let mut read_error: Option<BinlogError> = None;
        let source = lines.map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                read_error = Some(e);
                None
            }
        });

        let mut parser = BinlogParser::with_config(source, config).with_progress(progress);
        let chunk_size = config.chunk_size;
        let mut chunk = Vec::with_capacity(chunk_size.min(4096));

        for op in parser.by_ref() {
            chunk.push(op);
            if chunk_size > 0 && chunk.len() >= chunk_size {
                #[cfg(feature = "logging")]
                tracing::trace!("触发分块回调: {} 条记录", chunk.len());
                hook(&chunk);
                chunk.clear();
            }
        }

        if !chunk.is_empty() {
            hook(&chunk);
        }

        let summary = parser.summary();
        drop(parser);

        match read_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}
