//! 翻译结果缓存
//!
//! 以内容指纹为键的内存缓存，特点：
//!
//! - 条目在 `age < ttl` 期间可见，过期条目在读取时惰性删除，或由后台清理任务删除
//! - 容量是硬性准入上限：缓存满时拒绝新键，不驱逐已有条目
//! - 键值存储与条目计数由同一把锁保护，计数始终等于存储中的条目数
//! - 后台清理任务可以显式关闭，缓存被丢弃时也会自行退出

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use blake3::Hasher;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::translation::config::constants;
use crate::translation::error::{TranslationError, TranslationResult};

// ============================================================================
// 缓存键
// ============================================================================

/// 生成缓存键
///
/// 对 `source:target:text` 的原始字节取 blake3 摘要并输出十六进制。
/// 不做任何空白或大小写归一化，空的源语言按字面保留。
pub fn cache_key(text: &str, source_lang: &str, target_lang: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(source_lang.as_bytes());
    hasher.update(b":");
    hasher.update(target_lang.as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn new(value: String) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    /// 检查条目是否过期，惰性删除和后台清理共用这一判断
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// 缓存配置
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub max_size: usize,
    pub ttl: Duration,
    /// 后台清理周期，与 TTL 无关
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: constants::DEFAULT_CACHE_MAX_SIZE,
            ttl: constants::DEFAULT_CACHE_TTL,
            cleanup_interval: constants::DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// 因过期被删除的条目数（惰性删除与后台清理之和）
    pub expired: u64,
    /// 因缓存已满被拒绝的写入次数
    pub rejected: u64,
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    rejected: AtomicU64,
}

struct SweeperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

struct CacheInner {
    entries: Mutex<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    counters: CacheCounters,
    sweeper: Mutex<Option<SweeperHandle>>,
}

/// 翻译缓存
///
/// 克隆开销很小，所有克隆共享同一份存储。
#[derive(Clone)]
pub struct TranslationCache {
    inner: Arc<CacheInner>,
}

// ============================================================================
// 实现
// ============================================================================

impl CacheInner {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 删除全部过期条目，调用方需持有锁
    fn purge_locked(&self, entries: &mut HashMap<String, CacheEntry>) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.config.ttl));
        let removed = before - entries.len();
        self.counters
            .expired
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    fn purge_expired(&self) -> usize {
        let mut entries = self.entries();
        self.purge_locked(&mut entries)
    }
}

impl TranslationCache {
    /// 创建缓存（不启动后台清理）
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                config,
                counters: CacheCounters::default(),
                sweeper: Mutex::new(None),
            }),
        }
    }

    /// 创建缓存并启动后台清理任务，需要在 tokio 运行时中调用
    pub fn start(config: CacheConfig) -> TranslationResult<Self> {
        let cache = Self::new(config);
        cache.start_sweeper()?;
        Ok(cache)
    }

    /// 获取缓存条目
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.inner.entries();

        match entries.get(key) {
            Some(entry) if !entry.is_expired(self.inner.config.ttl) => {
                self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.inner.counters.expired.fetch_add(1, Ordering::Relaxed);
                self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 写入缓存条目
    ///
    /// 覆盖已有键不占用新容量。对新键，缓存已满时先回收过期条目，
    /// 仍然没有空位则返回 [`TranslationError::CacheFull`]。
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> TranslationResult<()> {
        let key = key.into();
        let max_size = self.inner.config.max_size;
        let mut entries = self.inner.entries();

        if !entries.contains_key(&key) && entries.len() >= max_size {
            self.inner.purge_locked(&mut entries);
            if entries.len() >= max_size {
                self.inner.counters.rejected.fetch_add(1, Ordering::Relaxed);
                return Err(TranslationError::CacheFull { max_size });
            }
        }

        entries.insert(key, CacheEntry::new(value.into()));
        Ok(())
    }

    /// 删除缓存条目，键不存在时什么也不做
    pub fn delete(&self, key: &str) -> bool {
        self.inner.entries().remove(key).is_some()
    }

    /// 清空缓存
    pub fn clear(&self) {
        self.inner.entries().clear();
    }

    /// 当前条目数（包括已过期但尚未清理的条目）
    pub fn size(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// 清理过期条目，返回删除数量
    pub fn cleanup_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        let counters = &self.inner.counters;
        CacheStats {
            size: self.size(),
            max_size: self.inner.config.max_size,
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            expired: counters.expired.load(Ordering::Relaxed),
            rejected: counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// 启动后台清理任务，已在运行时直接返回
    pub fn start_sweeper(&self) -> TranslationResult<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            TranslationError::InternalError(format!("后台清理任务需要 tokio 运行时: {}", e))
        })?;

        let mut sweeper = self.inner.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if sweeper.is_some() {
            return Ok(());
        }

        let interval = self.inner.config.cleanup_interval;
        if interval.is_zero() {
            return Err(TranslationError::ConfigError("缓存清理间隔必须大于0".to_string()));
        }
        let first_tick = tokio::time::Instant::now()
            .checked_add(interval)
            .ok_or_else(|| {
                TranslationError::ConfigError(format!("缓存清理间隔过大: {:?}", interval))
            })?;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = runtime.spawn(run_sweeper(
            Arc::downgrade(&self.inner),
            first_tick,
            interval,
            shutdown_rx,
        ));

        tracing::debug!("缓存清理任务已启动，周期 {:?}", interval);
        *sweeper = Some(SweeperHandle { shutdown, task });
        Ok(())
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.inner
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// 停止后台清理任务并等待其退出
    pub async fn shutdown(&self) {
        let handle = self
            .inner
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(SweeperHandle { shutdown, task }) = handle {
            // 任务可能已经退出，接收端不存在时忽略
            let _ = shutdown.send(());
            if let Err(e) = task.await {
                tracing::warn!("缓存清理任务异常退出: {}", e);
            }
            tracing::debug!("缓存清理任务已停止");
        }
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// 后台清理循环
///
/// 只持有弱引用：缓存被丢弃后下一次触发即退出。
async fn run_sweeper(
    inner: Weak<CacheInner>,
    first_tick: tokio::time::Instant,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                let removed = inner.purge_expired();
                if removed > 0 {
                    tracing::debug!("清理过期缓存条目 {} 个", removed);
                }
            }
            _ = &mut shutdown => break,
        }
    }
}
