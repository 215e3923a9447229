use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, extract::FromRef, middleware, routing::get, routing::post};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use taskd_auth::{AuthState, TokenService};
use taskd_db_postgres::PostgresStorage;
use taskd_storage::{DynTaskStorage, DynUserStorage, MemoryStorage};

use crate::{
    cache::{self, CacheBackend, ResponseCache},
    config::{AppConfig, StorageBackend},
    handlers, middleware as app_middleware,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tasks: DynTaskStorage,
    pub users: DynUserStorage,
    pub tokens: Arc<TokenService>,
    pub cache: CacheBackend,
}

impl AppState {
    /// Builds the state from configuration: storage backend, token
    /// service, and cache backend.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::from_config(&cfg.auth)?);
        let cache = crate::create_cache_backend(&cfg.redis).await;

        let (tasks, users): (DynTaskStorage, DynUserStorage) = match cfg.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                let mem = Arc::new(MemoryStorage::new());
                (mem.clone() as DynTaskStorage, mem as DynUserStorage)
            }
            StorageBackend::Postgres => {
                let pg = Arc::new(PostgresStorage::connect(&cfg.storage.postgres).await?);
                (pg.clone() as DynTaskStorage, pg as DynUserStorage)
            }
        };

        Ok(Self {
            tasks,
            users,
            tokens,
            cache,
        })
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        AuthState::new(state.tokens.clone())
    }
}

/// Builds the full application router from configuration.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg).await?;
    Ok(build_router(state, cfg))
}

/// Assembles the router over pre-built state.
///
/// Split from [`build_app`] so tests can inject their own storage.
pub fn build_router(state: AppState, cfg: &AppConfig) -> Router {
    let tasks_cache = ResponseCache::new(
        state.cache.clone(),
        cache::TASKS_SCOPE,
        cfg.cache.tasks_ttl(),
    );
    let task_cache = ResponseCache::new(state.cache.clone(), cache::TASK_SCOPE, cfg.cache.task_ttl());

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        // Identity endpoints
        .route("/auth/identify", post(handlers::auth::identify))
        .route("/auth/me", get(handlers::auth::me))
        // Task CRUD; reads on these routes go through the response cache
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks)
                .post(handlers::tasks::create_task)
                .layer(middleware::from_fn_with_state(
                    tasks_cache,
                    cache::cache_response,
                )),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task)
                .layer(middleware::from_fn_with_state(
                    task_cache,
                    cache::cache_response,
                )),
        )
        // Middleware stack (order: trace -> cors -> metrics -> request id -> auth -> cache -> handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::authentication_middleware,
        ))
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(middleware::from_fn(app_middleware::track_http))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        ))
        .with_state(state)
}

pub struct TaskdServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<TaskdServer> {
        crate::metrics::init_metrics();
        let app = build_app(&self.config).await?;

        Ok(TaskdServer {
            addr: self.addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskdServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
