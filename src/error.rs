//! 错误类型定义
//!
//! 解析核心（值解码、行分类、状态机、SQL 重建）本身不会失败，
//! 这里的错误只由外围部分产生：打开/读取文件、加载配置、写出导出文件。

/// binlog 分析库的结果类型
pub type Result<T> = std::result::Result<T, BinlogError>;

/// binlog 分析错误类型
#[derive(Debug, thiserror::Error)]
pub enum BinlogError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件反序列化错误
    #[error("配置解析错误: {0}")]
    Toml(#[from] toml::de::Error),

    /// 配置文件序列化错误
    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON 序列化错误
    #[cfg(feature = "exporter-json")]
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 日志错误（仅在启用 logging feature 时可用）
    #[cfg(feature = "logging")]
    #[error("日志错误: {0}")]
    Log(#[from] crate::logging::LogError),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl BinlogError {
    /// 创建一个配置错误
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        {
            crate::logging::ensure_logger_initialized();
            tracing::error!("配置错误: {}", message);
        }
        Self::Config(message)
    }

    /// 创建一个其他类型错误
    pub fn other<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        {
            crate::logging::ensure_logger_initialized();
            tracing::error!("未知错误: {}", message);
        }
        Self::Other(message)
    }

    /// 检查是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, BinlogError::Io(_))
    }

    /// 检查是否为配置错误（含 TOML 解析错误）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BinlogError::Config(_) | BinlogError::Toml(_) | BinlogError::TomlSer(_)
        )
    }

    /// 检查是否为其他错误
    pub fn is_other_error(&self) -> bool {
        matches!(self, BinlogError::Other(_))
    }
}
