//! 令牌桶限流器
//!
//! 全局单桶：容量为 `burst`，每隔 `refill_interval` 补充一个令牌，
//! 补充按经过时间连续计算（允许小数令牌）。启动时桶是满的。

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::translation::config::constants;

/// 限流器配置
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// 补充一个令牌所需的时间
    pub refill_interval: Duration,
    /// 桶容量
    pub burst: u32,
}

impl RateLimiterConfig {
    /// 由每分钟请求数换算补充周期
    pub fn per_minute(rpm: u32, burst: u32) -> Self {
        Self {
            refill_interval: Duration::from_secs(60) / rpm.max(1),
            burst,
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_minute(
            constants::DEFAULT_RATE_LIMIT_RPM,
            constants::DEFAULT_RATE_LIMIT_BURST,
        )
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// 令牌桶限流器
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    /// 每秒补充的令牌数
    rate: f64,
    capacity: f64,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let secs = config.refill_interval.as_secs_f64();
        let rate = if secs > 0.0 { 1.0 / secs } else { f64::INFINITY };
        let capacity = f64::from(config.burst);

        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            rate,
            capacity,
        }
    }

    /// 尝试取走一个令牌，成功返回 `true`，不会阻塞等待
    pub fn allow(&self) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            tracing::debug!("令牌不足，拒绝请求");
            false
        }
    }

    /// 当前可用的整数令牌数
    pub fn available(&self) -> u32 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket);
        bucket.tokens.floor() as u32
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
