//! Single-flight result cache.

use crate::Signature;
use derive_getters::Getters;
use odyssey_error::BuilderError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

/// Stored value and when it was computed.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.created_at.elapsed() > ttl)
    }
}

type Slot<V> = Arc<OnceCell<CacheEntry<V>>>;

/// Configuration for [`ScenarioCache`].
///
/// # Examples
///
/// ```
/// use odyssey_cache::ScenarioCacheConfig;
///
/// let config = ScenarioCacheConfig::default();
/// assert!(*config.enabled());
/// assert_eq!(*config.ttl_secs(), None);
///
/// let short_lived = config.with_ttl_secs(Some(60));
/// assert_eq!(*short_lived.ttl_secs(), Some(60));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(build_fn(error = "BuilderError"))]
pub struct ScenarioCacheConfig {
    /// Entry lifetime in seconds; `None` keeps entries for the whole session
    #[serde(default)]
    #[builder(default)]
    ttl_secs: Option<u64>,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for ScenarioCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: None,
            enabled: default_enabled(),
        }
    }
}

impl ScenarioCacheConfig {
    /// Start building a config.
    pub fn builder() -> ScenarioCacheConfigBuilder {
        ScenarioCacheConfigBuilder::default()
    }

    fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct CacheStats {
    /// Calls answered from a stored or in-flight value
    hits: u64,
    /// Calls that ran the computation and stored its result
    misses: u64,
}

/// Memoizes expensive computations by [`Signature`].
///
/// For any key at most one computation is in flight. Concurrent callers for
/// the same key wait for it and share its value. A failed computation is not
/// stored: the caller gets the error and the next caller computes afresh.
///
/// # Example
///
/// ```
/// use odyssey_cache::{ScenarioCache, ScenarioCacheConfig, Signature};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache: ScenarioCache<String> = ScenarioCache::new(ScenarioCacheConfig::default());
/// let key = Signature::from_parts(["Pip the hedgehog", "The Ordinary World"]);
///
/// let first = cache
///     .get_or_compute(&key, || async { Ok::<_, std::io::Error>("Dawn breaks.".to_string()) })
///     .await
///     .unwrap();
/// let second = cache
///     .get_or_compute(&key, || async { Ok::<_, std::io::Error>("never used".to_string()) })
///     .await
///     .unwrap();
///
/// assert_eq!(first, second);
/// assert_eq!(*cache.stats().misses(), 1);
/// # }
/// ```
pub struct ScenarioCache<V> {
    config: ScenarioCacheConfig,
    slots: Mutex<HashMap<Signature, Slot<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ScenarioCache<V> {
    /// Create an empty cache.
    pub fn new(config: ScenarioCacheConfig) -> Self {
        tracing::debug!(
            ttl_secs = ?config.ttl_secs,
            enabled = config.enabled,
            "Creating new ScenarioCache"
        );
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScenarioCacheConfig {
        &self.config
    }

    /// Return the value stored under `key`, running `compute` to produce it
    /// if absent.
    ///
    /// `compute` runs at most once per key even when callers race. Its error
    /// is returned unchanged and nothing is stored.
    #[tracing::instrument(skip(self, compute), fields(key = %key.short()))]
    pub async fn get_or_compute<F, Fut, E>(&self, key: &Signature, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, computing directly");
            return compute().await;
        }

        let slot = self.slot(key);
        if let Some(entry) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit");
            return Ok(entry.value.clone());
        }

        let mut ran = false;
        let result = slot
            .get_or_try_init(|| {
                ran = true;
                async move { compute().await.map(CacheEntry::new) }
            })
            .await;

        match result {
            Ok(entry) => {
                if ran {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Computed and stored entry");
                } else {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Shared in-flight computation");
                }
                Ok(entry.value.clone())
            }
            Err(err) => {
                tracing::warn!("Computation failed, key left uncached");
                Err(err)
            }
        }
    }

    /// Stored value for `key`, without computing.
    pub fn get(&self, key: &Signature) -> Option<V> {
        let ttl = self.config.ttl();
        self.lock()
            .get(key)
            .and_then(|slot| slot.get())
            .filter(|entry| !entry.is_expired(ttl))
            .map(|entry| entry.value.clone())
    }

    /// Whether a live value is stored for `key`.
    pub fn contains(&self, key: &Signature) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the value stored under `key`. Returns true when one was stored.
    pub fn invalidate(&self, key: &Signature) -> bool {
        let removed = self
            .lock()
            .remove(key)
            .is_some_and(|slot| slot.initialized());
        if removed {
            tracing::debug!(key = %key.short(), "Invalidated entry");
        }
        removed
    }

    /// Drop every stored value.
    pub fn clear(&self) {
        let mut slots = self.lock();
        let count = slots.len();
        slots.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Hit/miss counters since creation.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Slot for `key`, replacing it when its value has expired.
    fn slot(&self, key: &Signature) -> Slot<V> {
        let ttl = self.config.ttl();
        let mut slots = self.lock();
        if let Some(slot) = slots.get(key) {
            if !slot.get().is_some_and(|entry| entry.is_expired(ttl)) {
                return Arc::clone(slot);
            }
            tracing::debug!("Cache entry expired, replacing");
        }
        let slot: Slot<V> = Arc::new(OnceCell::new());
        slots.insert(key.clone(), Arc::clone(&slot));
        slot
    }

    // Critical sections never panic, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Signature, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for ScenarioCache<V> {
    fn default() -> Self {
        Self::new(ScenarioCacheConfig::default())
    }
}

impl<V> std::fmt::Debug for ScenarioCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioCache")
            .field("config", &self.config)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
