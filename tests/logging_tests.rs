//! 日志初始化的集成测试

#[cfg(feature = "logging")]
mod logging_tests {
    use binlog_analysis::logging::{LogConfig, init_logging};
    use tracing::Level;

    #[test]
    fn test_repeated_initialization_is_ok() {
        let config = LogConfig::new().level(Level::DEBUG).to_file(false);
        assert!(init_logging(config.clone()).is_ok());
        assert!(init_logging(config).is_ok());
    }

    #[test]
    fn test_level_names() {
        for name in ["trace", "debug", "info", "warn", "error", "INFO"] {
            assert!(LogConfig::from_level_name(name).is_ok(), "{name}");
        }
        assert!(LogConfig::from_level_name("verbose").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(config.to_file);
    }
}
