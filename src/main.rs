//! ABS Leads Backend
//!
//! REST backend for lead management with pluggable storage (SQLite or a JSON file)
//! and AI-generated offer texts.

mod api;
mod auth;
mod config;
mod errors;
mod models;
mod offer;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, StorageBackend};
use offer::OfferGenerator;
use store::LeadStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeadStore>,
    pub generator: Arc<OfferGenerator>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ABS Leads Backend");
    tracing::info!("Storage backend: {}", config.storage.as_str());
    match config.storage {
        StorageBackend::Sqlite => tracing::info!("Database path: {:?}", config.db_path),
        StorageBackend::JsonFile => tracing::info!("Leads file: {:?}", config.leads_file),
    }
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (ABS_API_PSK). Authentication is disabled!");
    }

    let generator = OfferGenerator::from_config(&config);
    if generator.is_configured() {
        tracing::info!("Offer texts via model {}", config.openai_model);
    } else {
        tracing::warn!("No OPENAI_API_KEY configured. Offer endpoints return a placeholder.");
    }

    // Open the lead store
    let store = store::open_store(&config).await?;

    let state = AppState {
        store,
        generator: Arc::new(generator),
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
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Leads
        .route("/leads", get(api::list_leads).post(api::create_lead))
        .route(
            "/leads/{id}",
            get(api::get_lead)
                .put(api::update_lead)
                .delete(api::delete_lead),
        )
        // Offer texts
        .route("/offer", post(api::generate_offer))
        .route("/offer/draft", post(api::draft_offer))
        .route("/ai/offer-text", post(api::generate_offer_text))
        // Demo mail
        .route("/mail", post(api::send_mail))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

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
