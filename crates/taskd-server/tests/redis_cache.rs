//! Integration tests for the caching infrastructure.
//!
//! These tests verify the two-tier caching system:
//! - L1 (DashMap): Local in-memory cache
//! - L2 (Redis): Shared cache across instances
//!
//! Tests use testcontainers to spin up a real Redis instance.

use std::sync::Arc;
use std::time::Duration;

use taskd_server::{CacheBackend, RedisConfig, create_cache_backend};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

// Shared Redis container for all tests
static SHARED_REDIS: OnceCell<(ContainerAsync<Redis>, String)> = OnceCell::const_new();

const TTL: Duration = Duration::from_secs(60);

/// Get or create the shared Redis container
async fn get_redis_url() -> String {
    let (_, url) = SHARED_REDIS
        .get_or_init(|| async {
            let container = Redis::default()
                .start()
                .await
                .expect("start redis container");

            let host_port = container.get_host_port_ipv4(6379).await.expect("get port");
            let url = format!("redis://127.0.0.1:{}", host_port);

            (container, url)
        })
        .await;

    url.clone()
}

fn redis_config(url: String) -> RedisConfig {
    RedisConfig {
        enabled: true,
        url,
        pool_size: 5,
        timeout_ms: 5000,
    }
}

#[tokio::test]
async fn test_local_cache_get_set() {
    let cache = CacheBackend::new_local();

    cache.set("tasks:/tasks", b"list".to_vec(), TTL).await;

    let value = cache.get("tasks:/tasks", TTL).await;
    assert_eq!(value, Some(Arc::new(b"list".to_vec())));

    let stats = cache.stats();
    assert_eq!(stats.mode, "local");
    assert_eq!(stats.l1_entries, 1);
}

#[tokio::test]
async fn test_local_cache_expiration() {
    let cache = CacheBackend::new_local();

    // Set with very short TTL
    cache
        .set("expiring_key", b"value".to_vec(), Duration::from_millis(100))
        .await;

    // Should be available immediately
    assert!(cache.get("expiring_key", TTL).await.is_some());

    // Wait for expiration
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Should be expired now
    assert!(cache.get("expiring_key", TTL).await.is_none());
}

#[tokio::test]
async fn test_local_scope_invalidation() {
    let cache = CacheBackend::new_local();

    cache.set("tasks:/tasks", b"list".to_vec(), TTL).await;
    cache
        .set("tasks:/tasks?completed=true", b"filtered".to_vec(), TTL)
        .await;
    cache.set("task:/tasks/1", b"one".to_vec(), TTL).await;

    cache.invalidate_scope("tasks").await;

    // Both "tasks" entries are gone; the "task" scope is untouched
    assert!(cache.get("tasks:/tasks", TTL).await.is_none());
    assert!(cache.get("tasks:/tasks?completed=true", TTL).await.is_none());
    assert!(cache.get("task:/tasks/1", TTL).await.is_some());
}

#[tokio::test]
async fn test_redis_cache_connection() {
    let config = redis_config(get_redis_url().await);

    let cache = create_cache_backend(&config).await;

    // Should have connected to Redis
    assert!(cache.is_redis_available().await);

    let stats = cache.stats();
    assert_eq!(stats.mode, "redis");
}

#[tokio::test]
async fn test_redis_cache_get_set() {
    let config = redis_config(get_redis_url().await);
    let cache = create_cache_backend(&config).await;

    cache
        .set("redis_test_key", b"redis_test_value".to_vec(), TTL)
        .await;

    // Wait a bit for async write to complete
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Get the value back (should hit L1 first)
    let value = cache.get("redis_test_key", TTL).await;
    assert_eq!(value, Some(Arc::new(b"redis_test_value".to_vec())));
}

#[tokio::test]
async fn test_redis_cache_l1_l2_promotion() {
    let config = redis_config(get_redis_url().await);

    // Create first cache instance
    let cache1 = create_cache_backend(&config).await;

    cache1
        .set("promotion_key", b"promotion_value".to_vec(), TTL)
        .await;

    // Wait for write to L2
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Create second cache instance (simulating another server)
    let cache2 = create_cache_backend(&config).await;

    // Get from cache2 - should retrieve from L2 (Redis) and promote to L1
    let value = cache2.get("promotion_key", TTL).await;
    assert_eq!(value, Some(Arc::new(b"promotion_value".to_vec())));

    // Second get should hit L1
    let value = cache2.get("promotion_key", TTL).await;
    assert_eq!(value, Some(Arc::new(b"promotion_value".to_vec())));
}

#[tokio::test]
async fn test_promotion_does_not_outlive_redis_expiry() {
    let config = redis_config(get_redis_url().await);

    let cache1 = create_cache_backend(&config).await;
    cache1
        .set("short:/lived", b"v".to_vec(), Duration::from_secs(1))
        .await;

    // Wait for the L2 write
    tokio::time::sleep(Duration::from_millis(200)).await;

    // A fresh instance promotes the entry from L2; the local copy must
    // inherit the remaining Redis lifetime, not the full route TTL
    let cache2 = create_cache_backend(&config).await;
    assert!(cache2.get("short:/lived", TTL).await.is_some());

    // Past the original expiry, both tiers must miss
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(cache2.get("short:/lived", TTL).await.is_none());
}

#[tokio::test]
async fn test_redis_scope_invalidation_reaches_other_instances() {
    let config = redis_config(get_redis_url().await);

    let cache1 = create_cache_backend(&config).await;
    cache1.set("scoped:/a", b"a".to_vec(), TTL).await;
    cache1.set("scoped:/b", b"b".to_vec(), TTL).await;
    cache1.set("other:/c", b"c".to_vec(), TTL).await;

    // Wait for L2 writes
    tokio::time::sleep(Duration::from_millis(200)).await;

    cache1.invalidate_scope("scoped").await;

    // Wait for the background SCAN + DEL
    tokio::time::sleep(Duration::from_millis(300)).await;

    // A fresh instance (empty L1) must not find the scoped entries in L2
    let cache2 = create_cache_backend(&config).await;
    assert!(cache2.get("scoped:/a", TTL).await.is_none());
    assert!(cache2.get("scoped:/b", TTL).await.is_none());
    assert!(cache2.get("other:/c", TTL).await.is_some());
}

#[tokio::test]
async fn test_graceful_degradation_invalid_url() {
    let config = RedisConfig {
        enabled: true,
        url: "redis://nonexistent:9999".to_string(),
        pool_size: 5,
        timeout_ms: 1000,
    };

    // Should fall back to local cache
    let cache = create_cache_backend(&config).await;

    // Should not be connected to Redis
    assert!(!cache.is_redis_available().await);

    // But should still work as local cache
    cache
        .set("fallback_key", b"fallback_value".to_vec(), TTL)
        .await;

    let value = cache.get("fallback_key", TTL).await;
    assert_eq!(value, Some(Arc::new(b"fallback_value".to_vec())));

    let stats = cache.stats();
    assert_eq!(stats.mode, "local");
}

#[tokio::test]
async fn test_disabled_redis() {
    let config = RedisConfig {
        enabled: false,
        url: "redis://localhost:6379".to_string(),
        pool_size: 5,
        timeout_ms: 5000,
    };

    let cache = create_cache_backend(&config).await;

    // Should be local-only
    assert!(!cache.is_redis_available().await);

    let stats = cache.stats();
    assert_eq!(stats.mode, "local");
}
