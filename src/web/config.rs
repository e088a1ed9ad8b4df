//! Web 服务器配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use std::path::PathBuf;

use crate::env::{EnvError, EnvResult, EnvVar};

/// Web 服务器配置
#[derive(Debug, Clone, PartialEq)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// 静态文件目录，`None` 时不提供静态文件
    pub static_dir: Option<PathBuf>,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::web;

        let bind_addr = web::BindAddress::get()?;
        let port = web::Port::get()?;
        let static_dir_str = web::StaticDir::get()?;
        let static_dir = if static_dir_str.is_empty() {
            None
        } else {
            Some(PathBuf::from(static_dir_str))
        };

        Ok(Self {
            bind_addr,
            port,
            static_dir,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        use crate::env::web;

        if self.bind_addr.trim().is_empty() {
            return Err(EnvError {
                variable: web::BindAddress::NAME.to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: web::Port::NAME.to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if let Some(ref static_dir) = self.static_dir {
            if !static_dir.exists() {
                tracing::warn!("静态文件目录 '{}' 不存在", static_dir.display());
            }
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("无法从环境变量加载 Web 配置: {}，使用默认值", e);
            Self {
                bind_addr: "0.0.0.0".to_string(),
                port: 5000,
                static_dir: Some(PathBuf::from("static")),
            }
        })
    }
}
