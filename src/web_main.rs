//! Web 服务器主程序入口

use std::sync::Arc;

use clap::Parser;
use doubao_translator::env::{core as env_core, EnvVar};
use doubao_translator::translation::{ConfigManager, TranslationService};
use doubao_translator::web::{WebConfig, WebServer};

/// 豆包翻译服务
#[derive(Parser, Debug)]
#[command(name = "doubao-translator", version, about)]
struct Args {
    /// 绑定地址（默认读取 BIND_ADDRESS，否则 0.0.0.0）
    #[arg(short, long)]
    bind: Option<String>,

    /// 监听端口（默认读取 PORT，否则 5000）
    #[arg(short, long)]
    port: Option<u16>,

    /// 配置文件路径（TOML 或 JSON）
    #[arg(short, long)]
    config: Option<String>,

    /// 打印环境变量说明后退出
    #[arg(long)]
    env_docs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.env_docs {
        println!("{}", doubao_translator::env::generate_env_docs());
        return Ok(());
    }

    init_logging();

    let manager = match args.config {
        Some(path) => ConfigManager::from_file(&path)?,
        None => ConfigManager::new()?,
    };
    let config = manager.into_config();

    let mut web_config = WebConfig::default();
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    web_config.validate()?;

    let service = Arc::new(TranslationService::from_config(&config)?);
    tracing::info!(
        "缓存: 容量 {}，TTL {:?}；限流: 每分钟 {} 次，突发 {}",
        config.cache_max_size,
        config.cache_ttl(),
        config.rate_limit_rpm,
        config.rate_limit_burst
    );

    let server = WebServer::new(web_config, service);
    server.start().await?;

    Ok(())
}

/// 根据 LOG_LEVEL 与 NO_COLOR 初始化日志
fn init_logging() {
    let level = env_core::LogLevel::get()
        .ok()
        .and_then(|level| level.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    let no_color = env_core::NoColor::get().unwrap_or(false);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}
