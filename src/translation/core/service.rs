//! 翻译服务核心实现
//!
//! [`TranslationService`] 负责单个翻译请求的完整流程：
//!
//! 1. 限流检查，令牌不足立即拒绝
//! 2. 输入校验（空文本、空目标语言、超长文本）
//! 3. 按内容指纹查询缓存，命中直接返回
//! 4. 未命中时分块，按顺序逐块调用提供方，任一分块失败则整个请求失败
//! 5. 用换行符拼接译文并写入缓存，缓存已满只记录日志
//!
//! 服务本身只持有共享状态的句柄，可以放在 `Arc` 中被所有请求并发使用。
//! 调用提供方期间不持有任何缓存或限流器的锁。

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::translation::{
    config::{constants, TranslationConfig},
    core::client::{DoubaoClient, TranslationProvider},
    core::rate_limiter::RateLimiter,
    error::{TranslationError, TranslationResult},
    pipeline::split_text,
    storage::cache::{cache_key, TranslationCache},
};

/// 服务运行参数
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    /// 请求文本的最大字符数
    pub max_text_length: usize,
    /// 单个分块的最大字符数
    pub chunk_size: usize,
    /// 单次提供方调用（含客户端内部重试）的截止时间
    pub call_timeout: Duration,
}

impl ServiceOptions {
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        Ok(Self {
            max_text_length: config.max_text_length,
            chunk_size: constants::CHUNK_SIZE,
            call_timeout: provider_call_timeout(config)?,
        })
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            max_text_length: constants::DEFAULT_MAX_TEXT_LENGTH,
            chunk_size: constants::CHUNK_SIZE,
            call_timeout: constants::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// 每次 HTTP 尝试的超时加上重试退避的总和
fn provider_call_timeout(config: &TranslationConfig) -> TranslationResult<Duration> {
    let attempts = config.max_retries.saturating_add(1);
    let backoff_units = 2u32
        .checked_pow(config.max_retries)
        .map(|units| units - 1);

    backoff_units
        .and_then(|units| constants::RETRY_BASE_DELAY.checked_mul(units))
        .zip(config.request_timeout().checked_mul(attempts))
        .and_then(|(backoff, requests)| requests.checked_add(backoff))
        .ok_or_else(|| {
            TranslationError::ConfigError(format!(
                "请求超时 {:?} 与重试次数 {} 的组合过大",
                config.request_timeout(),
                config.max_retries
            ))
        })
}

/// 一次成功翻译的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationOutcome {
    pub text: String,
    /// 结果是否来自缓存
    pub cached: bool,
}

/// 统一的翻译服务
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    cache: TranslationCache,
    limiter: RateLimiter,
    options: ServiceOptions,
    stats: ServiceStats,
}

impl TranslationService {
    /// 根据配置创建服务，使用豆包客户端并启动缓存清理任务
    ///
    /// 需要在 tokio 运行时中调用。
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        let client = DoubaoClient::new(config.provider_config())?;
        Self::new(config, Arc::new(client))
    }

    /// 根据配置和给定的提供方创建服务
    pub fn new(
        config: &TranslationConfig,
        provider: Arc<dyn TranslationProvider>,
    ) -> TranslationResult<Self> {
        let options = ServiceOptions::from_config(config)?;
        let cache = TranslationCache::start(config.cache_config())?;
        let limiter = RateLimiter::new(config.rate_limiter_config());
        Self::from_parts(provider, cache, limiter, options)
    }

    /// 由已构造好的组件组装服务
    pub fn from_parts(
        provider: Arc<dyn TranslationProvider>,
        cache: TranslationCache,
        limiter: RateLimiter,
        options: ServiceOptions,
    ) -> TranslationResult<Self> {
        if options.chunk_size == 0 {
            return Err(TranslationError::ConfigError(
                "分块大小必须大于0".to_string(),
            ));
        }
        if options.max_text_length == 0 {
            return Err(TranslationError::ConfigError(
                "最大文本长度必须大于0".to_string(),
            ));
        }
        if options.call_timeout.is_zero() {
            return Err(TranslationError::ConfigError(
                "请求超时时间必须大于0".to_string(),
            ));
        }

        Ok(Self {
            provider,
            cache,
            limiter,
            options,
            stats: ServiceStats::default(),
        })
    }

    /// 翻译一段文本
    ///
    /// `source_lang` 可以为空，表示由提供方自动检测。
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<TranslationOutcome> {
        let start_time = Instant::now();
        self.stats.inc_requests();

        if !self.limiter.allow() {
            self.stats.inc_rate_limited();
            tracing::warn!("请求被限流拒绝");
            return Err(TranslationError::RateLimitExceeded);
        }

        if let Err(e) = self.validate(text, target_lang) {
            self.stats.inc_rejected_inputs();
            tracing::info!("拒绝无效请求: {}", e);
            return Err(e);
        }

        let char_count = text.chars().count();
        tracing::info!(
            "翻译请求: {} 字符, {} -> {}",
            char_count,
            if source_lang.is_empty() { "auto" } else { source_lang },
            target_lang
        );

        let key = cache_key(text, source_lang, target_lang);
        if let Some(cached) = self.cache.get(&key) {
            self.stats.inc_cache_hits();
            tracing::debug!("缓存命中: {}", key);
            return Ok(TranslationOutcome {
                text: cached,
                cached: true,
            });
        }
        self.stats.inc_cache_misses();

        let chunks = split_text(text, self.options.chunk_size)?;
        tracing::debug!("文本分为 {} 块", chunks.len());

        let mut translated = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let call = self
                .provider
                .translate_chunk(chunk, source_lang, target_lang);

            match tokio::time::timeout(self.options.call_timeout, call).await {
                Ok(Ok(result)) => {
                    self.stats.inc_chunks_translated();
                    translated.push(result);
                }
                Ok(Err(e)) => {
                    self.stats.inc_provider_failures();
                    tracing::error!("第 {}/{} 块翻译失败: {}", index + 1, chunks.len(), e);
                    return Err(TranslationError::from(e)
                        .with_context(format!("第 {} 块", index + 1)));
                }
                Err(elapsed) => {
                    self.stats.inc_provider_failures();
                    tracing::error!(
                        "第 {}/{} 块翻译超时 ({:?})",
                        index + 1,
                        chunks.len(),
                        self.options.call_timeout
                    );
                    return Err(TranslationError::from(elapsed)
                        .with_context(format!("第 {} 块", index + 1)));
                }
            }
        }

        let result = translated.join(constants::CHUNK_JOINER);

        if let Err(e) = self.cache.set(key, result.clone()) {
            tracing::warn!("翻译结果未缓存: {}", e);
        }

        self.stats.inc_translations_completed();
        self.stats.add_chars_processed(char_count);
        self.stats.add_processing_time(start_time.elapsed());

        Ok(TranslationOutcome {
            text: result,
            cached: false,
        })
    }

    /// 处理请求体无法解析的请求
    ///
    /// 与正常请求一样先消耗令牌，令牌不足时返回限流错误，否则返回输入错误。
    pub fn reject_malformed(&self, reason: impl Into<String>) -> TranslationError {
        self.stats.inc_requests();

        if !self.limiter.allow() {
            self.stats.inc_rate_limited();
            tracing::warn!("请求被限流拒绝");
            return TranslationError::RateLimitExceeded;
        }

        self.stats.inc_rejected_inputs();
        let error = TranslationError::InvalidInput(format!("请求格式错误: {}", reason.into()));
        tracing::info!("拒绝无效请求: {}", error);
        error
    }

    fn validate(&self, text: &str, target_lang: &str) -> TranslationResult<()> {
        if text.is_empty() {
            return Err(TranslationError::InvalidInput("文本不能为空".to_string()));
        }
        if target_lang.trim().is_empty() {
            return Err(TranslationError::InvalidInput(
                "目标语言不能为空".to_string(),
            ));
        }

        let length = text.chars().count();
        if length > self.options.max_text_length {
            return Err(TranslationError::InputTooLarge {
                length,
                max: self.options.max_text_length,
            });
        }

        Ok(())
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub fn get_stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// 获取服务健康状态
    ///
    /// - 缓存已满或限流器令牌耗尽时降级
    /// - 缓存清理任务停止时不健康
    pub fn get_health(&self) -> HealthStatus {
        let mut components = HashMap::new();

        let cache_stats = self.cache.stats();
        let cache_level = if cache_stats.size >= cache_stats.max_size {
            HealthLevel::Degraded
        } else {
            HealthLevel::Healthy
        };
        components.insert("cache".to_string(), cache_level);

        let sweeper_level = if self.cache.is_sweeper_running() {
            HealthLevel::Healthy
        } else {
            HealthLevel::Unhealthy
        };
        components.insert("cache_sweeper".to_string(), sweeper_level);

        let limiter_level = if self.limiter.available() == 0 {
            HealthLevel::Degraded
        } else {
            HealthLevel::Healthy
        };
        components.insert("rate_limiter".to_string(), limiter_level);

        let overall = if components
            .values()
            .all(|&level| level == HealthLevel::Healthy)
        {
            HealthLevel::Healthy
        } else if components
            .values()
            .any(|&level| level == HealthLevel::Unhealthy)
        {
            HealthLevel::Unhealthy
        } else {
            HealthLevel::Degraded
        };

        HealthStatus {
            overall,
            components,
        }
    }

    /// 停止后台任务
    pub async fn shutdown(&self) {
        self.cache.shutdown().await;
        tracing::info!("翻译服务已关闭");
    }
}

/// 翻译服务统计信息（线程安全版本）
#[derive(Debug, Default)]
pub struct ServiceStats {
    /// 收到的翻译请求数
    pub requests: AtomicUsize,
    pub cache_hits: AtomicUsize,
    pub cache_misses: AtomicUsize,
    /// 被限流拒绝的请求数
    pub rate_limited: AtomicUsize,
    /// 输入校验失败的请求数
    pub rejected_inputs: AtomicUsize,
    pub chunks_translated: AtomicUsize,
    pub provider_failures: AtomicUsize,
    pub translations_completed: AtomicUsize,
    pub total_chars_processed: AtomicUsize,
    /// 总处理时间，以微秒为单位存储
    pub processing_time: AtomicU64,
}

impl ServiceStats {
    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected_inputs(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_chunks_translated(&self) {
        self.chunks_translated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_provider_failures(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_translations_completed(&self) {
        self.translations_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_chars_processed(&self, count: usize) {
        self.total_chars_processed
            .fetch_add(count, Ordering::Relaxed);
    }

    /// 添加处理时间（微秒精度）
    pub fn add_processing_time(&self, duration: Duration) {
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// 获取统计数据快照
    ///
    /// 各字段分别读取，高并发下不保证彼此处于同一时刻。
    pub fn snapshot(&self) -> ServiceStatsSnapshot {
        ServiceStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            chunks_translated: self.chunks_translated.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            translations_completed: self.translations_completed.load(Ordering::Relaxed),
            total_chars_processed: self.total_chars_processed.load(Ordering::Relaxed),
            processing_time: Duration::from_micros(self.processing_time.load(Ordering::Relaxed)),
        }
    }
}

/// 翻译服务统计数据的不可变快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceStatsSnapshot {
    pub requests: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub rate_limited: usize,
    pub rejected_inputs: usize,
    pub chunks_translated: usize,
    pub provider_failures: usize,
    pub translations_completed: usize,
    pub total_chars_processed: usize,
    pub processing_time: Duration,
}

/// 翻译服务的健康状态报告
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// 整体健康级别
    pub overall: HealthLevel,
    /// 各组件的健康级别
    pub components: HashMap<String, HealthLevel>,
}

/// 健康级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Unhealthy,
}
