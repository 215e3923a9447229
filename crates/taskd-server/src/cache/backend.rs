//! Cache backend implementation with L1 (DashMap) and L2 (Redis) tiers.

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One stored response body with its expiry.
///
/// The bytes sit behind an `Arc` so a hit hands out a handle instead of
/// copying the body.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<Vec<u8>>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Response cache storage, either in-process only or backed by Redis.
///
/// Every operation is best-effort: a failing Redis tier turns a read
/// into a miss and a write into a local-only write, never into an error
/// on the request path.
#[derive(Clone)]
pub enum CacheBackend {
    /// Single instance, DashMap only.
    Local(Arc<DashMap<String, CachedEntry>>),

    /// Redis shared across instances, with a DashMap in front as L1.
    Redis {
        redis: Pool,
        local: Arc<DashMap<String, CachedEntry>>,
    },
}

impl CacheBackend {
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    pub fn new_redis(redis_pool: Pool) -> Self {
        CacheBackend::Redis {
            redis: redis_pool,
            local: Arc::new(DashMap::new()),
        }
    }

    /// Look a key up, L1 first, then Redis.
    ///
    /// An L2 hit is promoted into L1; `ttl` caps the promoted entry's
    /// lifetime (the remaining Redis expiry caps it further).
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<Arc<Vec<u8>>> {
        match self {
            CacheBackend::Local(map) => {
                let result = map
                    .get(key)
                    .filter(|entry| !entry.is_expired())
                    .map(|entry| Arc::clone(&entry.data));

                if result.is_some() {
                    crate::metrics::record_cache_hit("L1");
                } else {
                    crate::metrics::record_cache_miss();
                }

                result
            }
            CacheBackend::Redis { redis, local } => {
                if let Some(entry) = local.get(key) {
                    if !entry.is_expired() {
                        tracing::debug!(key = %key, "cache hit (L1)");
                        crate::metrics::record_cache_hit("L1");
                        return Some(Arc::clone(&entry.data));
                    } else {
                        // drop the guard before mutating the map
                        drop(entry);
                        local.remove(key);
                    }
                }

                match redis.get().await {
                    Ok(mut conn) => match conn.get::<_, Option<Vec<u8>>>(key).await {
                        Ok(Some(data)) => {
                            tracing::debug!(key = %key, "cache hit (L2)");
                            crate::metrics::record_cache_hit("L2");

                            // Clamp the promotion TTL to what is left in
                            // Redis so the local copy cannot outlive the
                            // shared entry.
                            let promote_ttl = match conn.ttl::<_, i64>(key).await {
                                Ok(secs) if secs > 0 => ttl.min(Duration::from_secs(secs as u64)),
                                _ => ttl,
                            };

                            let entry = CachedEntry::new(data, promote_ttl);
                            let data_arc = Arc::clone(&entry.data);
                            local.insert(key.to_string(), entry);

                            Some(data_arc)
                        }
                        Ok(None) => {
                            tracing::debug!(key = %key, "cache miss");
                            crate::metrics::record_cache_miss();
                            None
                        }
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Redis GET error");
                            crate::metrics::record_cache_miss();
                            None
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to get Redis connection");
                        crate::metrics::record_cache_miss();
                        None
                    }
                }
            }
        }
    }

    /// Store a value under `key` for `ttl`.
    ///
    /// L1 is written synchronously; the Redis write happens in a spawned
    /// task and is never awaited by the caller.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        match self {
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
            }
            CacheBackend::Redis { redis, local } => {
                let entry = CachedEntry::new(value, ttl);
                let data_for_redis = Arc::clone(&entry.data);
                local.insert(key.to_string(), entry);

                let redis = redis.clone();
                let key = key.to_string();
                let ttl_secs = ttl.as_secs();
                tokio::spawn(async move {
                    if let Ok(mut conn) = redis.get().await {
                        if let Err(e) = conn
                            .set_ex::<_, _, ()>(&key, &*data_for_redis, ttl_secs)
                            .await
                        {
                            tracing::warn!(key = %key, error = %e, "Redis SET error");
                        } else {
                            tracing::debug!(key = %key, ttl_secs = %ttl_secs, "cache set (L1+L2)");
                        }
                    }
                });
            }
        }
    }

    /// Invalidate every entry in a scope.
    ///
    /// A scope is the key prefix before the first `:`. All entries whose
    /// keys start with `{scope}:` are dropped from L1 immediately; in
    /// Redis mode the matching L2 keys are deleted in the background via
    /// SCAN so mutations never block on Redis round-trips.
    pub async fn invalidate_scope(&self, scope: &str) {
        let prefix = format!("{scope}:");
        match self {
            CacheBackend::Local(map) => {
                map.retain(|key, _| !key.starts_with(&prefix));
                tracing::debug!(scope = %scope, "cache scope invalidated (local)");
            }
            CacheBackend::Redis { redis, local } => {
                local.retain(|key, _| !key.starts_with(&prefix));

                let redis = redis.clone();
                let scope = scope.to_string();
                let pattern = format!("{prefix}*");
                tokio::spawn(async move {
                    let mut conn = match redis.get().await {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(scope = %scope, error = %e, "Failed to get Redis connection");
                            return;
                        }
                    };

                    // Collect matching keys first; the SCAN iterator holds
                    // the connection borrow.
                    let mut keys: Vec<String> = Vec::new();
                    match conn.scan_match::<_, String>(&pattern).await {
                        Ok(mut iter) => {
                            while let Some(key) = iter.next_item().await {
                                keys.push(key);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(scope = %scope, error = %e, "Redis SCAN error");
                            return;
                        }
                    }

                    if keys.is_empty() {
                        return;
                    }

                    let count = keys.len();
                    if let Err(e) = conn.del::<_, ()>(keys).await {
                        tracing::warn!(scope = %scope, error = %e, "Redis DEL error");
                    } else {
                        tracing::debug!(scope = %scope, keys = count, "cache scope invalidated (L1+L2)");
                    }
                });
            }
        }
    }

    /// L1 entry count and mode, for logs and tests.
    pub fn stats(&self) -> CacheStats {
        match self {
            CacheBackend::Local(map) => CacheStats {
                l1_entries: map.len(),
                mode: "local".to_string(),
            },
            CacheBackend::Redis { local, .. } => CacheStats {
                l1_entries: local.len(),
                mode: "redis".to_string(),
            },
        }
    }

    /// Whether a Redis connection can currently be acquired.
    pub async fn is_redis_available(&self) -> bool {
        match self {
            CacheBackend::Local(_) => false,
            CacheBackend::Redis { redis, .. } => redis.get().await.is_ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub l1_entries: usize,
    pub mode: String,
}
