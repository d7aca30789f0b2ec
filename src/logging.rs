//! 日志初始化模块
//!
//! 基于 tracing 的统一日志初始化：控制台输出 + logs 目录按天滚动的文件输出。
//! 解析核心只调用 tracing 宏，是否安装订阅者由调用方决定。

use std::str::FromStr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 日志文件目录
const LOG_DIR: &str = "logs";

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "binlog-analysis";

/// 日志配置结构体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: Level,
    /// 是否同时写入 logs 目录
    pub to_file: bool,
}

impl LogConfig {
    /// 创建新的日志配置，使用默认级别
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志级别
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 设置是否写入日志文件
    pub fn to_file(mut self, to_file: bool) -> Self {
        self.to_file = to_file;
        self
    }

    /// 从级别名称（trace/debug/info/warn/error）构造配置
    pub fn from_level_name(name: &str) -> LogResult<Self> {
        let level = Level::from_str(name)
            .map_err(|_| LogError::Config(format!("无效的日志级别: {name}")))?;
        Ok(Self::default().level(level))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::INFO, to_file: true }
    }
}

/// 自动初始化日志系统（仅初始化一次）
static INIT_LOGGER: Once = Once::new();

/// 确保日志系统已初始化
///
/// 首次调用时安装默认订阅者；若外部已安装订阅者则静默忽略。
pub(crate) fn ensure_logger_initialized() {
    INIT_LOGGER.call_once(|| {
        let _ = init_default_logging();
    });
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("日志配置错误: {0}")]
    Config(String),
}

/// 日志初始化结果
pub type LogResult<T> = Result<T, LogError>;

/// 初始化日志系统
///
/// - 环境变量 `RUST_LOG` 优先，否则使用 `config.level`
/// - 控制台输出带颜色
/// - `to_file` 为真时写入 `logs/binlog-analysis.YYYY-MM-DD`
///
/// 重复初始化不视为错误。
///
/// # Examples
///
/// ```no_run
/// use binlog_analysis::logging::{init_logging, LogConfig};
/// use tracing::Level;
///
/// init_logging(LogConfig::new().level(Level::DEBUG)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> LogResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let console_layer = fmt::layer()
        .with_timer(SystemTime)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(true);

    let subscriber = Registry::default().with(env_filter).with(console_layer);

    if !config.to_file {
        if subscriber.try_init().is_ok() {
            tracing::info!("日志系统初始化完成 - 仅控制台输出");
        }
        return Ok(());
    }

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(SystemTime)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(false);

    match subscriber.with(file_layer).try_init() {
        Ok(()) => {
            // guard 需要存活到进程结束
            std::mem::forget(guard);
            tracing::info!("日志系统初始化完成 - 输出到控制台和 {} 目录", LOG_DIR);
            Ok(())
        }
        Err(_) => Ok(()),
    }
}

/// 使用默认配置初始化日志系统
///
/// ```no_run
/// use binlog_analysis::logging::init_default_logging;
///
/// init_default_logging().unwrap();
/// ```
pub fn init_default_logging() -> LogResult<()> {
    init_logging(LogConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_level_name() {
        let config = LogConfig::from_level_name("debug").unwrap();
        assert_eq!(config.level, Level::DEBUG);
        assert!(LogConfig::from_level_name("verbose").is_err());
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::new().level(Level::WARN).to_file(false);
        assert_eq!(config.level, Level::WARN);
        assert!(!config.to_file);
    }
}
