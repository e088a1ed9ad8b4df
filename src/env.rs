//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。变量名沿用部署脚本中已有的名称
//! （`ARK_API_KEY`、`CACHE_TTL`、`PORT` 等）。

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone, PartialEq)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 仅在变量已设置时返回解析结果，未设置时返回 `None`
    fn get_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.trim().to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }

    /// 显式指定的配置文件路径
    pub struct ConfigPath;
    impl EnvVar<String> for ConfigPath {
        const NAME: &'static str = "TRANSLATOR_CONFIG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path to a TOML or JSON configuration file";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }
}

/// 翻译服务提供方相关环境变量
pub mod provider {
    use super::*;

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "ARK_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值，必须设置
        const DESCRIPTION: &'static str = "Bearer token for the translation API (required)";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "ARK_API_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::constants::DEFAULT_API_URL.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 模型标识
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "ARK_MODEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::constants::DEFAULT_MODEL.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Model identifier sent with every translation request";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }

    /// 单次请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Timeout of a single translation API call (seconds or 30s/1m)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let timeout = parse_duration(value, Self::NAME)?;
            if timeout.is_zero() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Timeout must be greater than 0".to_string(),
                });
            }
            Ok(timeout)
        }
    }

    /// 客户端重试次数
    pub struct MaxRetries;
    impl EnvVar<u32> for MaxRetries {
        const NAME: &'static str = "MAX_RETRIES";
        const DEFAULT: Option<u32> = Some(0);
        const DESCRIPTION: &'static str = "Retries of a failed API call inside the client (0 disables)";

        fn parse(value: &str) -> EnvResult<u32> {
            let retries = parse_positive_usize(value, Self::NAME, 0, 10)?;
            Ok(retries as u32)
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 缓存TTL
    pub struct Ttl;
    impl EnvVar<Duration> for Ttl {
        const NAME: &'static str = "CACHE_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(3600));
        const DESCRIPTION: &'static str = "Cache TTL (seconds, or a duration such as 90s, 15m, 1h)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let ttl = parse_duration(value, Self::NAME)?;
            if ttl.is_zero() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "TTL must be greater than 0".to_string(),
                });
            }
            Ok(ttl)
        }
    }

    /// 缓存最大条目数
    pub struct MaxSize;
    impl EnvVar<usize> for MaxSize {
        const NAME: &'static str = "CACHE_MAX_SIZE";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str = "Maximum number of cached translations";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1_000_000)
        }
    }

    /// 过期清理间隔
    pub struct CleanupInterval;
    impl EnvVar<Duration> for CleanupInterval {
        const NAME: &'static str = "CACHE_CLEANUP_INTERVAL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(600));
        const DESCRIPTION: &'static str = "Interval of the background expiry sweep";

        fn parse(value: &str) -> EnvResult<Duration> {
            let interval = parse_duration(value, Self::NAME)?;
            if interval.is_zero() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Interval must be greater than 0".to_string(),
                });
            }
            Ok(interval)
        }
    }
}

/// 请求准入相关环境变量
pub mod limits {
    use super::*;

    /// 单次请求最大文本长度
    pub struct MaxTextLength;
    impl EnvVar<usize> for MaxTextLength {
        const NAME: &'static str = "MAX_TEXT_LENGTH";
        const DEFAULT: Option<usize> = Some(5000);
        const DESCRIPTION: &'static str = "Maximum characters accepted per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1_000_000)
        }
    }

    /// 每分钟请求数
    pub struct RateLimitRpm;
    impl EnvVar<u32> for RateLimitRpm {
        const NAME: &'static str = "RATE_LIMIT_RPM";
        const DEFAULT: Option<u32> = Some(30);
        const DESCRIPTION: &'static str = "Sustained requests per minute admitted by the rate limiter";

        fn parse(value: &str) -> EnvResult<u32> {
            let rpm = parse_positive_usize(value, Self::NAME, 1, 60_000)?;
            Ok(rpm as u32)
        }
    }

    /// 突发容量
    pub struct RateLimitBurst;
    impl EnvVar<u32> for RateLimitBurst {
        const NAME: &'static str = "RATE_LIMIT_BURST";
        const DEFAULT: Option<u32> = Some(30);
        const DESCRIPTION: &'static str = "Token bucket burst capacity";

        fn parse(value: &str) -> EnvResult<u32> {
            let burst = parse_positive_usize(value, Self::NAME, 1, 100_000)?;
            Ok(burst as u32)
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("0.0.0.0".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Web server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "PORT";
        const DEFAULT: Option<u16> = Some(5000);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;
            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }
            Ok(port)
        }
    }

    /// 静态文件目录
    pub struct StaticDir;
    impl EnvVar<String> for StaticDir {
        const NAME: &'static str = "STATIC_DIR";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("static".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Static files directory (empty disables static serving)";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// 辅助函数
fn non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 解析时长：纯数字按秒计，否则接受 `500ms`、`90s`、`15m`、`1h`、`1h30m` 形式
pub fn parse_duration(value: &str, var_name: &str) -> EnvResult<Duration> {
    let invalid = || EnvError {
        variable: var_name.to_string(),
        message: format!("Invalid duration '{}'. Use seconds or units ms/s/m/h", value),
    };

    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    if value.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(invalid());
        }
        let amount: u64 = rest[..digits_end].parse().map_err(|_| invalid())?;
        rest = &rest[digits_end..];

        let unit_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let part = match unit {
            "ms" => Some(Duration::from_millis(amount)),
            "s" => Some(Duration::from_secs(amount)),
            "m" => amount.checked_mul(60).map(Duration::from_secs),
            "h" => amount.checked_mul(3600).map(Duration::from_secs),
            _ => return Err(invalid()),
        };
        total = part
            .and_then(|part| total.checked_add(part))
            .ok_or_else(invalid)?;
    }

    Ok(total)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let rows: Vec<(&str, &str, String)> = vec![
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "info".to_string()),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION, format!("{:?}", core::NoColor::DEFAULT)),
        (core::ConfigPath::NAME, core::ConfigPath::DESCRIPTION, "-".to_string()),
        (provider::ApiKey::NAME, provider::ApiKey::DESCRIPTION, "-".to_string()),
        (
            provider::ApiUrl::NAME,
            provider::ApiUrl::DESCRIPTION,
            crate::translation::config::constants::DEFAULT_API_URL.to_string(),
        ),
        (
            provider::Model::NAME,
            provider::Model::DESCRIPTION,
            crate::translation::config::constants::DEFAULT_MODEL.to_string(),
        ),
        (provider::RequestTimeout::NAME, provider::RequestTimeout::DESCRIPTION, format!("{:?}", provider::RequestTimeout::DEFAULT)),
        (provider::MaxRetries::NAME, provider::MaxRetries::DESCRIPTION, format!("{:?}", provider::MaxRetries::DEFAULT)),
        (cache::Ttl::NAME, cache::Ttl::DESCRIPTION, format!("{:?}", cache::Ttl::DEFAULT)),
        (cache::MaxSize::NAME, cache::MaxSize::DESCRIPTION, format!("{:?}", cache::MaxSize::DEFAULT)),
        (cache::CleanupInterval::NAME, cache::CleanupInterval::DESCRIPTION, format!("{:?}", cache::CleanupInterval::DEFAULT)),
        (limits::MaxTextLength::NAME, limits::MaxTextLength::DESCRIPTION, format!("{:?}", limits::MaxTextLength::DEFAULT)),
        (limits::RateLimitRpm::NAME, limits::RateLimitRpm::DESCRIPTION, format!("{:?}", limits::RateLimitRpm::DEFAULT)),
        (limits::RateLimitBurst::NAME, limits::RateLimitBurst::DESCRIPTION, format!("{:?}", limits::RateLimitBurst::DEFAULT)),
        (web::BindAddress::NAME, web::BindAddress::DESCRIPTION, "0.0.0.0".to_string()),
        (web::Port::NAME, web::Port::DESCRIPTION, format!("{:?}", web::Port::DEFAULT)),
        (web::StaticDir::NAME, web::StaticDir::DESCRIPTION, "static".to_string()),
    ];

    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");
    docs.push_str("| Variable | Description | Default |\n");
    docs.push_str("|---|---|---|\n");
    for (name, description, default) in rows {
        docs.push_str(&format!("| `{}` | {} | {} |\n", name, description, default));
    }
    docs
}
