pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod server;

pub use cache::{CacheBackend, CachedEntry, ResponseCache};
pub use config::{AppConfig, CacheConfig, RedisConfig, ServerConfig, StorageBackend};
pub use error::ApiError;
pub use observability::{init_tracing, init_tracing_with_level};
pub use server::{AppState, ServerBuilder, TaskdServer, build_app, build_router};

/// Build the cache backend for the configured mode.
///
/// With Redis disabled this is a plain in-process cache. With Redis
/// enabled the pool is created and probed once at startup; any failure
/// logs a warning and the server runs local-only instead of refusing
/// to start.
pub async fn create_cache_backend(config: &RedisConfig) -> CacheBackend {
    if !config.enabled {
        tracing::info!("redis disabled, caching in-process only");
        return CacheBackend::new_local();
    }

    match connect_redis(config).await {
        Ok(pool) => {
            tracing::info!(url = %config.url, "redis cache tier connected");
            CacheBackend::new_redis(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, "redis unavailable, caching in-process only");
            CacheBackend::new_local()
        }
    }
}

async fn connect_redis(config: &RedisConfig) -> anyhow::Result<deadpool_redis::Pool> {
    use std::time::Duration;

    let timeout = Some(Duration::from_millis(config.timeout_ms));
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = timeout;
    pool_config.timeouts.create = timeout;
    pool_config.timeouts.recycle = timeout;

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    redis_config.pool = Some(pool_config);

    let pool = redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1))?;

    // One round-trip so an unreachable Redis is caught here, not on the
    // first request.
    pool.get().await?;

    Ok(pool)
}
