// 集成测试公共模块
//
// 提供脚本化的翻译服务提供方和服务构造辅助函数

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use doubao_translator::translation::{
    CacheConfig, ProviderError, RateLimiter, RateLimiterConfig, ServiceOptions, TranslationCache,
    TranslationProvider, TranslationService,
};

/// 记录调用的脚本化提供方
///
/// 默认把文本转为大写；可以指定在第几次调用（从0开始）失败，或者每次调用前等待。
#[derive(Default)]
pub struct ScriptedProvider {
    calls: Mutex<Vec<String>>,
    fail_on: Option<usize>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(call_index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(call_index),
            ..Self::default()
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    async fn translate_chunk(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, ProviderError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(text.to_string());
            calls.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on == Some(index) {
            return Err(ProviderError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }

        Ok(text.to_uppercase())
    }
}

/// 测试服务构造器
pub struct TestServiceBuilder {
    cache: CacheConfig,
    limiter: RateLimiterConfig,
    options: ServiceOptions,
}

impl Default for TestServiceBuilder {
    fn default() -> Self {
        Self {
            cache: CacheConfig {
                max_size: 100,
                ttl: Duration::from_secs(60),
                cleanup_interval: Duration::from_secs(60),
            },
            limiter: RateLimiterConfig {
                refill_interval: Duration::from_secs(3600),
                burst: 100,
            },
            options: ServiceOptions {
                max_text_length: 5000,
                chunk_size: 800,
                call_timeout: Duration::from_secs(5),
            },
        }
    }
}

impl TestServiceBuilder {
    pub fn cache_max_size(mut self, max_size: usize) -> Self {
        self.cache.max_size = max_size;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = ttl;
        self
    }

    pub fn burst(mut self, burst: u32) -> Self {
        self.limiter.burst = burst;
        self
    }

    pub fn refill_interval(mut self, interval: Duration) -> Self {
        self.limiter.refill_interval = interval;
        self
    }

    pub fn max_text_length(mut self, max: usize) -> Self {
        self.options.max_text_length = max;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.options.chunk_size = size;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.options.call_timeout = timeout;
        self
    }

    pub fn build(self, provider: Arc<ScriptedProvider>) -> TranslationService {
        TranslationService::from_parts(
            provider,
            TranslationCache::new(self.cache),
            RateLimiter::new(self.limiter),
            self.options,
        )
        .expect("valid test service")
    }
}
