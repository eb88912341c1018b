use axum::{
    routing::{delete, get, post, put},
    Router,
    middleware,
};
use dashmap::DashMap;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use nonzero_ext::nonzero;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod models {
    pub mod content_models;
    pub mod download_models;
    pub mod user_models;
}
pub mod repositories {
    pub mod content_repository;
    pub mod download_store;
    pub mod user_core;
}
pub mod services {
    pub mod download_stats;
    pub mod download_tracker;
    pub mod eye_cycle;
    pub mod installers;
    pub mod site_content;
    pub mod terms_gate;
}
pub mod handlers {
    pub mod admin_handlers;
    pub mod auth_dtos;
    pub mod auth_handlers;
    pub mod auth_middleware;
    pub mod content_dtos;
    pub mod content_handlers;
    pub mod download_handlers;
}
pub mod utils {
    pub mod validation;
}

use config::SiteConfig;
use handlers::{admin_handlers, auth_handlers, content_handlers, download_handlers};
use handlers::download_handlers::DownloadIntent;
use repositories::{
    content_repository::ContentRepository,
    download_store::{DownloadStore, SqliteDownloadStore},
    user_core::UserCore,
};
use services::{download_stats::StatsCache, download_tracker::DownloadTracker, installers::InstallerCatalog};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

pub struct AppState {
    pub config: SiteConfig,
    pub tracker: DownloadTracker,
    pub installers: InstallerCatalog,
    pub content: Arc<ContentRepository>,
    pub user_core: Arc<UserCore>,
    pub download_intents: DashMap<Uuid, DownloadIntent>,
    pub login_limiter: KeyedLimiter,
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn new(config: SiteConfig, db_pool: DbPool) -> Self {
        let store: Arc<dyn DownloadStore> = Arc::new(SqliteDownloadStore::new(db_pool.clone()));
        Self::with_download_store(config, db_pool, store)
    }

    /// Same as `new` but with download events kept in `downloads` instead of
    /// the SQLite pool.
    pub fn with_download_store(
        config: SiteConfig,
        db_pool: DbPool,
        downloads: Arc<dyn DownloadStore>,
    ) -> Self {
        let stats = Arc::new(StatsCache::new(downloads.clone(), config.stats_stale_after));
        let tracker = DownloadTracker::new(downloads, stats);
        let installers = InstallerCatalog::from_config(&config);
        Self {
            content: Arc::new(ContentRepository::new(db_pool.clone())),
            user_core: Arc::new(UserCore::new(db_pool.clone())),
            download_intents: DashMap::new(),
            // 5 attempts per minute per email
            login_limiter: RateLimiter::keyed(Quota::per_minute(nonzero!(5u32))),
            started_at: std::time::Instant::now(),
            config,
            tracker,
            installers,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // Public routes that don't need authentication
    let public_routes = Router::new()
        .route("/api/health", get(content_handlers::health_check))
        .route("/api/terms", get(download_handlers::get_terms))
        .route("/api/demo/eye-state", get(content_handlers::eye_demo_state))
        .route("/api/bug-reports", post(content_handlers::submit_bug_report))
        .route("/api/bug-reports/quick", post(content_handlers::submit_quick_note))
        .route("/api/join-requests", post(content_handlers::submit_join_request))
        .route("/api/blog", get(content_handlers::list_published_posts))
        .route("/api/blog/{id}", get(content_handlers::get_published_post))
        .route("/api/admin/login", post(auth_handlers::login))
        .route("/api/admin/setup", post(auth_handlers::setup_admin));

    let download_routes = Router::new()
        .route("/api/downloads/stats", get(download_handlers::get_stats))
        .route("/api/downloads/installers", get(download_handlers::list_installers))
        .route("/api/downloads/{platform}/file", get(download_handlers::installer_file))
        .route("/api/downloads/intents", post(download_handlers::create_intent))
        .route("/api/downloads/intents/{id}/agree", post(download_handlers::agree))
        .route("/api/downloads/intents/{id}/cancel", post(download_handlers::cancel))
        .route("/api/downloads/intents/{id}/dismiss", post(download_handlers::dismiss_setup));

    // Admin routes that need admin authentication
    let admin_routes = Router::new()
        .route("/api/admin/session", get(auth_handlers::session))
        .route(
            "/api/admin/blog",
            get(admin_handlers::list_all_posts).post(admin_handlers::create_post),
        )
        .route(
            "/api/admin/blog/{id}",
            put(admin_handlers::update_post).delete(admin_handlers::delete_post),
        )
        .route("/api/admin/blog/{id}/toggle-published", post(admin_handlers::toggle_post_published))
        .route("/api/admin/bug-reports", get(admin_handlers::list_bug_reports))
        .route("/api/admin/bug-reports/{id}/status", post(admin_handlers::update_bug_report_status))
        .route("/api/admin/bug-reports/{id}", delete(admin_handlers::delete_bug_report))
        .route("/api/admin/join-requests", get(admin_handlers::list_join_requests))
        .route_layer(middleware::from_fn_with_state(state.clone(), handlers::auth_middleware::require_admin));

    let frontend_origin = state
        .config
        .frontend_url
        .parse::<axum::http::HeaderValue>()
        .map_err(|e| anyhow::anyhow!("Invalid FRONTEND_URL {}: {}", state.config.frontend_url, e))?;

    let app = Router::new()
        .merge(public_routes)
        .merge(download_routes)
        .merge(admin_routes)
        .nest_service("/downloads", ServeDir::new(&state.config.downloads_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
        )
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_origin(AllowOrigin::exact(frontend_origin))
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::ACCEPT,
                    axum::http::header::ORIGIN,
                ])
                .allow_credentials(true)
        )
        .with_state(state);
    Ok(app)
}
