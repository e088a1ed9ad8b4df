//! 错误处理与配置加载集成测试

use std::io::Write;

use doubao_translator::env::{cache as env_cache, parse_duration, EnvVar};
use doubao_translator::translation::{
    ConfigManager, ErrorCategory, ErrorSeverity, TranslationConfig, TranslationError,
};
use tempfile::NamedTempFile;

#[test]
fn test_every_error_has_a_category() {
    let cases = [
        (TranslationError::RateLimitExceeded, ErrorCategory::RateLimit),
        (
            TranslationError::InputTooLarge { length: 2, max: 1 },
            ErrorCategory::Input,
        ),
        (
            TranslationError::InvalidInput("empty".into()),
            ErrorCategory::Input,
        ),
        (
            TranslationError::ProviderFailure("502".into()),
            ErrorCategory::Upstream,
        ),
        (
            TranslationError::TimeoutError("late".into()),
            ErrorCategory::Upstream,
        ),
        (
            TranslationError::CacheFull { max_size: 1 },
            ErrorCategory::Cache,
        ),
        (
            TranslationError::ConfigError("bad".into()),
            ErrorCategory::Configuration,
        ),
        (
            TranslationError::InternalError("bug".into()),
            ErrorCategory::Internal,
        ),
    ];

    for (error, category) in cases {
        assert_eq!(error.category(), category, "{:?}", error);
        assert!(!error.to_string().is_empty());
    }
}

#[test]
fn test_configuration_errors_are_critical() {
    assert_eq!(
        TranslationError::ConfigError("x".into()).severity(),
        ErrorSeverity::Critical
    );
    assert!(TranslationError::CacheFull { max_size: 1 }.severity() < ErrorSeverity::Error);
}

#[test]
fn test_rate_limit_message_is_user_facing() {
    assert_eq!(
        TranslationError::RateLimitExceeded.to_string(),
        "请求过于频繁，请稍后再试"
    );
}

#[test]
fn test_default_config_requires_api_key() {
    let config = TranslationConfig::default();
    assert!(matches!(
        config.validate(),
        Err(TranslationError::ConfigError(msg)) if msg.contains("ARK_API_KEY")
    ));

    assert!(TranslationConfig::with_api_key("key").validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_limits() {
    let mutations: [fn(&mut TranslationConfig); 6] = [
        |c| c.cache_max_size = 0,
        |c| c.cache_ttl_secs = 0,
        |c| c.max_text_length = 0,
        |c| c.rate_limit_rpm = 0,
        |c| c.rate_limit_burst = 0,
        |c| c.api_url = "ftp://example.com".to_string(),
    ];

    for mutate in mutations {
        let mut config = TranslationConfig::with_api_key("key");
        mutate(&mut config);
        assert!(config.validate().is_err());
    }
}

#[test]
fn test_load_toml_file_with_partial_fields() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "api_key = \"from-file\"\ncache_max_size = 42\nrate_limit_rpm = 60"
    )
    .unwrap();

    let config = ConfigManager::load_from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.api_key, "from-file");
    assert_eq!(config.cache_max_size, 42);
    assert_eq!(config.rate_limit_interval().as_secs(), 1);
    // 未出现的字段使用默认值
    assert_eq!(config.max_text_length, 5000);
    assert_eq!(config.cache_ttl_secs, 3600);
}

#[test]
fn test_load_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"api_key": "json-key", "max_text_length": 100}}"#).unwrap();

    let config = ConfigManager::load_from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.api_key, "json-key");
    assert_eq!(config.max_text_length, 100);
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "cache_max_size = \"lots\"").unwrap();

    assert!(matches!(
        ConfigManager::load_from_file(file.path().to_str().unwrap()),
        Err(TranslationError::ConfigError(_))
    ));

    assert!(matches!(
        ConfigManager::load_from_file("/definitely/not/here.toml"),
        Err(TranslationError::ConfigError(_))
    ));
}

#[test]
fn test_duration_strings() {
    assert_eq!(parse_duration("90", "X").unwrap().as_secs(), 90);
    assert_eq!(parse_duration("15m", "X").unwrap().as_secs(), 900);
    assert_eq!(parse_duration("1h30m", "X").unwrap().as_secs(), 5400);
    assert_eq!(parse_duration("500ms", "X").unwrap().as_millis(), 500);
    assert!(parse_duration("soon", "X").is_err());

    assert!(env_cache::Ttl::parse("0").is_err());
    assert_eq!(env_cache::Ttl::parse("2h").unwrap().as_secs(), 7200);
}
