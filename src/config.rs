//! 配置管理模块
//!
//! 统一的 TOML 配置读取与校验。所有段都可以省略，省略时使用默认值。

use crate::binlog::classifier::DEFAULT_MIN_UNIX_TIMESTAMP;
use crate::binlog::progress::{DEFAULT_LINE_PROGRESS_INTERVAL, DEFAULT_RECORD_PROGRESS_INTERVAL};
use crate::binlog::reconstruct::DEFAULT_WHERE_PREFIX_LIMIT;
use crate::error::{BinlogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 主配置结构体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 日志配置
    pub log: LogSection,
    /// 解析配置
    pub parser: ParserConfig,
    /// 导出配置
    pub export: ExportConfig,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 是否写入 logs 目录
    pub to_file: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self { level: "info".to_string(), to_file: true }
    }
}

/// 解析配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 每处理多少行上报一次进度
    pub line_progress_interval: usize,
    /// 每输出多少条记录上报一次进度
    pub record_progress_interval: usize,
    /// 生成 WHERE 子句时最多使用的列数
    pub where_prefix_limit: usize,
    /// 不大于该值的 Unix 秒不换算为日期
    pub min_unix_timestamp: i64,
    /// 文件解析时每次回调的记录数，0 表示一次性回调
    pub chunk_size: usize,
    /// 并发解析的线程数
    pub thread_count: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_progress_interval: DEFAULT_LINE_PROGRESS_INTERVAL,
            record_progress_interval: DEFAULT_RECORD_PROGRESS_INTERVAL,
            where_prefix_limit: DEFAULT_WHERE_PREFIX_LIMIT,
            min_unix_timestamp: DEFAULT_MIN_UNIX_TIMESTAMP,
            chunk_size: 1000,
            thread_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// 导出配置，未设置的输出不生成
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// JSON 输出路径
    pub json: Option<String>,
    /// CSV 输出路径
    pub csv: Option<String>,
    /// 回滚 SQL 脚本输出路径
    pub rollback_sql: Option<String>,
}

impl ExportConfig {
    pub fn is_empty(&self) -> bool {
        self.json.is_none() && self.csv.is_none() && self.rollback_sql.is_none()
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从字符串加载配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        match self.log.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(BinlogError::config_error(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        if self.parser.line_progress_interval == 0 || self.parser.record_progress_interval == 0 {
            return Err(BinlogError::config_error("进度上报间隔不能为0"));
        }

        if self.parser.where_prefix_limit == 0 {
            return Err(BinlogError::config_error("WHERE 列数上限不能为0"));
        }

        if self.parser.thread_count == 0 {
            return Err(BinlogError::config_error("线程数不能为0"));
        }

        if self.export.is_empty() {
            #[cfg(feature = "logging")]
            tracing::debug!("没有配置任何导出输出");
        }

        Ok(())
    }

    /// 转换为日志初始化参数
    #[cfg(feature = "logging")]
    pub fn log_config(&self) -> Result<crate::logging::LogConfig> {
        let config = crate::logging::LogConfig::from_level_name(&self.log.level)?;
        Ok(config.to_file(self.log.to_file))
    }
}
