//! binlog 解码文本解析模块
//!
//! 行分类、记录组装、值解码、SQL 重建以及文件驱动

pub mod assembler;
pub mod classifier;
pub mod concurrent;
pub mod io;
pub mod parser;
pub mod progress;
pub mod reconstruct;
pub mod sync_parser;
pub mod types;
pub mod utils;
pub mod value;

#[cfg(feature = "async")]
pub mod async_parser;

// 重新导出核心类型和函数
pub use assembler::{Assembler, AssemblerStats};
pub use classifier::{LineClassifier, LineKind, Section, classify};
pub use concurrent::{ConcurrentParser, FileParseResult};
pub use io::{LossyLines, open_lines, sniff_file};
pub use parser::{BinlogParser, ParseSummary, parse_lines, parse_lines_with_config, parse_str};
#[cfg(feature = "logging")]
pub use progress::LoggingProgress;
pub use progress::{NoProgress, ProgressEvent, ProgressReporter, ProgressSink};
pub use reconstruct::{SqlReconstructor, reconstruct};
pub use sync_parser::SyncBinlogParser;
pub use types::{ChangeKind, ChangeOperation, ColumnValue, EventContext, ScalarValue, UNKNOWN};
pub use utils::looks_like_decoded_text;
pub use value::{Repair, decode, decode_with_repair};

#[cfg(feature = "async")]
pub use async_parser::AsyncBinlogParser;
