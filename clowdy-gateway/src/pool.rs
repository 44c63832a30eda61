//! Assignment — the warm sandbox pool.
//!
//! Sandboxes are keyed by (image, network-enabled); within a key, entries
//! are released and reused LIFO for cache warmth. Across keys, the
//! eviction policy is a global LRU over `idle_since`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clowdy_core::PoolKey;
use clowdy_sandbox::SandboxHandle;

/// Default maximum number of warm sandboxes across all keys.
pub const DEFAULT_MAX_POOL_SIZE: usize = 10;
/// Default idle duration after which an entry becomes reap-eligible.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// Default interval between reaper sweeps.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(30);

struct PoolEntry {
    handle: SandboxHandle,
    idle_since: Instant,
}

#[derive(Default)]
struct PoolState {
    entries: HashMap<PoolKey, Vec<PoolEntry>>,
}

impl PoolState {
    fn total_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Remove and return the entry with the globally smallest `idle_since`.
    /// Ties break by first-encountered key, then by position within that
    /// key's vector.
    fn evict_lru(&mut self) -> Option<SandboxHandle> {
        let mut best: Option<(PoolKey, usize, Instant)> = None;
        for (key, entries) in &self.entries {
            for (index, entry) in entries.iter().enumerate() {
                let is_better = match &best {
                    None => true,
                    Some((_, _, best_idle)) => entry.idle_since < *best_idle,
                };
                if is_better {
                    best = Some((key.clone(), index, entry.idle_since));
                }
            }
        }

        let (key, index, _) = best?;
        let entries = self.entries.get_mut(&key)?;
        let entry = entries.remove(index);
        if entries.is_empty() {
            self.entries.remove(&key);
        }
        Some(entry.handle)
    }
}

/// Snapshot counts: total pooled entries and the count held under each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub total: usize,
    pub per_key: HashMap<PoolKey, usize>,
}

/// The warm sandbox pool, generic over the sandbox driver implementation
/// only through the handle it stores.
pub struct Pool<D: clowdy_sandbox::SandboxDriver> {
    state: Mutex<PoolState>,
    placement: clowdy_sandbox::Placement<D>,
    max_pool_size: usize,
    idle_timeout: Duration,
}

impl<D: clowdy_sandbox::SandboxDriver> Pool<D> {
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, DEFAULT_MAX_POOL_SIZE, DEFAULT_IDLE_TIMEOUT)
    }

    #[must_use]
    pub fn with_config(driver: D, max_pool_size: usize, idle_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            placement: clowdy_sandbox::Placement::new(driver),
            max_pool_size,
            idle_timeout,
        }
    }

    #[must_use]
    pub fn placement(&self) -> &clowdy_sandbox::Placement<D> {
        &self.placement
    }

    /// Pop the most-recently-released entry for `key`, if any.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn acquire(&self, key: &PoolKey) -> Option<SandboxHandle> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut state = self.state.lock().expect("pool lock poisoned");
        let entries = state.entries.get_mut(key)?;
        let entry = entries.pop();
        if entries.is_empty() {
            state.entries.remove(key);
        }
        entry.map(|e| e.handle)
    }

    /// Release `handle` back to the pool under `key`, evicting the
    /// globally least-recently-used entry first if the pool is full.
    /// Eviction's destroy call happens outside the lock.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub async fn release(&self, handle: SandboxHandle, key: PoolKey) {
        let evicted = {
            #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
            let mut state = self.state.lock().expect("pool lock poisoned");
            let evicted =
                if state.total_count() >= self.max_pool_size { state.evict_lru() } else { None };

            state
                .entries
                .entry(key)
                .or_default()
                .push(PoolEntry { handle, idle_since: Instant::now() });
            evicted
        };

        if let Some(evicted) = evicted {
            self.placement.destroy(evicted).await;
        }
    }

    /// Remove every entry whose idle duration exceeds `idle_timeout`, then
    /// destroy each outside the lock.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub async fn reap(&self) {
        let expired = {
            #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
            let mut state = self.state.lock().expect("pool lock poisoned");
            let now = Instant::now();
            let mut expired = Vec::new();

            state.entries.retain(|_, entries| {
                let (keep, drop): (Vec<_>, Vec<_>) =
                    entries.drain(..).partition(|e| now.duration_since(e.idle_since) <= self.idle_timeout);
                *entries = keep;
                expired.extend(drop.into_iter().map(|e| e.handle));
                !entries.is_empty()
            });

            expired
        };

        for handle in expired {
            self.placement.destroy(handle).await;
        }
    }

    /// Spawn the periodic reaper task. Resilient to a single `reap` taking
    /// long; the next tick simply fires after it returns.
    pub fn run_reaper(self: std::sync::Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()>
    where
        D: 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.reap().await;
            }
        })
    }

    /// Drain and destroy every pooled entry. Idempotent — calling it on an
    /// already-empty pool is a no-op.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub async fn shutdown(&self) {
        let all = {
            #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
            let mut state = self.state.lock().expect("pool lock poisoned");
            let drained: Vec<SandboxHandle> =
                state.entries.drain().flat_map(|(_, entries)| entries).map(|e| e.handle).collect();
            drained
        };

        for handle in all {
            self.placement.destroy(handle).await;
        }
    }

    /// Snapshot the total pooled count and the count held under each key.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let state = self.state.lock().expect("pool lock poisoned");
        let per_key = state.entries.iter().map(|(key, entries)| (key.clone(), entries.len())).collect();
        PoolStats { total: state.total_count(), per_key }
    }
}
