//! Ludoteca Backend
//!
//! REST backend for the board game catalog. Games are read from a spreadsheet,
//! normalized into one canonical shape, and served alongside per-game comments
//! stored in SQLite.

mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod sheets;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog::ImageTable;
use config::{Config, SheetConfig};
use db::Repository;
use sheets::SheetSource;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub sheet: Arc<dyn SheetSource>,
    pub images: Arc<ImageTable>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Ludoteca Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Sheet source: {}", sheet_label(&config.sheet));
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (LUDOTECA_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Load the image table once; it does not change while running
    let images = match &config.image_map_path {
        Some(path) => {
            let table = sheets::load_image_table(path).await?;
            tracing::info!("Image table loaded with {} entries", table.len());
            table
        }
        None => ImageTable::default(),
    };

    // Create application state
    let state = AppState {
        repo,
        sheet: Arc::from(sheets::from_config(&config.sheet)),
        images: Arc::new(images),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn sheet_label(sheet: &SheetConfig) -> &'static str {
    match sheet {
        SheetConfig::None => "none",
        SheetConfig::File(_) => "file",
        SheetConfig::Google { .. } => "google",
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Write endpoints require the PSK
    let psk = state.config.api_psk.clone();
    let require_psk =
        middleware::from_fn(move |req, next| auth::psk_auth_layer(psk.clone(), req, next));

    let api_routes = Router::new()
        // Catalog
        .route(
            "/juegos",
            get(api::list_games).merge(post(api::create_game).layer(require_psk.clone())),
        )
        .route("/juegos/{nombre}", get(api::get_game))
        .route("/sheets", get(api::get_sheet))
        // Comments
        .route(
            "/comentarios",
            get(api::list_comments).post(api::create_comment),
        )
        .route(
            "/comentarios/{id}",
            delete(api::delete_comment).layer(require_psk),
        );

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

#[cfg(test)]
mod tests;
