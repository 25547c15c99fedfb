//! Staff records backend
//!
//! Employee profiles, daily staff arrangements and the phone directory
//! export, served over REST with SQLite persistence and Tantivy search.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod export;
mod models;
mod pin;
mod search;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use models::ProfileFilter;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting staff backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    match &config.arrangement_office {
        Some(office) => tracing::info!("Arrangements limited to office {}", office),
        None => tracing::info!("Arrangements cover all offices"),
    }

    if config.api_key.is_none() {
        tracing::warn!("No API key configured (STAFF_API_KEY). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    tracing::info!("Building search index...");
    let profiles = repo.list_profiles(&ProfileFilter::default()).await?;
    search.rebuild(&profiles).await?;

    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        // Profiles
        .route("/profiles", get(api::list_profiles).post(api::create_profile))
        .route("/profiles/search", get(api::search_profiles))
        .route(
            "/profiles/{id}",
            get(api::get_profile).put(api::update_profile),
        )
        .route("/pin/{pin}", get(api::check_pin))
        // Organization
        .route(
            "/departments",
            get(api::list_departments).post(api::create_department),
        )
        .route(
            "/departments/{id}",
            get(api::get_department)
                .put(api::update_department)
                .delete(api::delete_department),
        )
        .route(
            "/positions",
            get(api::list_positions).post(api::create_position),
        )
        .route(
            "/positions/{id}",
            get(api::get_position)
                .put(api::update_position)
                .delete(api::delete_position),
        )
        .route("/offices", get(api::list_offices).post(api::create_office))
        .route(
            "/offices/{id}",
            get(api::get_office)
                .put(api::update_office)
                .delete(api::delete_office),
        )
        // Arrangements
        .route("/arrangements", get(api::list_arrangements))
        .route(
            "/arrangements/{id}",
            get(api::get_arrangement).patch(api::update_arrangement_field),
        )
        .route("/arrangements/import-day", post(api::import_day))
        .route("/arrangements/generate-month", post(api::generate_month))
        .route("/arrangements/clear-day", post(api::clear_day))
        .route("/arrangements/delete-day", post(api::delete_day))
        // Directory
        .route("/directory", get(api::get_directory))
        .route("/directory/export", get(api::export_directory))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
