//! MySQL 行格式 binlog 解码文本分析库
//!
//! 输入为 `mysqlbinlog -v --base64-output=DECODE-ROWS` 的输出文本，
//! 解析出 INSERT / UPDATE / DELETE 行变更，并为每条变更重建正向与回滚 SQL。

// 核心模块 - 始终可用
pub mod binlog;
pub mod config;
pub mod error;

// 分析与导出
pub mod analysis;
pub mod exporter;

#[cfg(feature = "logging")]
pub mod logging;

pub use binlog::{BinlogParser, ChangeKind, ChangeOperation, ParseSummary, SyncBinlogParser, parse_str};
pub use config::Config;
pub use error::{BinlogError, Result};
