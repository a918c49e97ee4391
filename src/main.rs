use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mans_space::config::AppConfig;
use mans_space::handlers;
use mans_space::models::Catalog;
use mans_space::services::ai::gemini::GeminiProvider;
use mans_space::services::ai::LlmProvider;
use mans_space::services::store::AppointmentStore;
use mans_space::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = AppointmentStore::open(&config.database_url)?;
    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    tracing::info!(
        services = catalog.services.len(),
        products = catalog.products.len(),
        team = catalog.team.len(),
        "catalog loaded"
    );

    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY not set, the assistant will answer with the fallback reply");
    }
    let llm: Box<dyn LlmProvider> = Box::new(GeminiProvider::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));

    let state = Arc::new(AppState {
        store,
        catalog,
        sessions: Mutex::new(HashMap::new()),
        llm,
        config: config.clone(),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/catalog", get(handlers::catalog::get_catalog))
        .route("/api/availability/dates", get(handlers::availability::get_dates))
        .route("/api/availability/slots", get(handlers::availability::get_slots))
        .route("/api/session", post(handlers::booking::create_session))
        .route("/api/session/:id", get(handlers::booking::get_session))
        .route(
            "/api/session/:id/selection/service",
            post(handlers::booking::toggle_service),
        )
        .route(
            "/api/session/:id/selection/product",
            post(handlers::booking::adjust_product),
        )
        .route(
            "/api/session/:id/selection/product/add",
            post(handlers::booking::add_product),
        )
        .route("/api/session/:id/login", post(handlers::booking::login))
        .route(
            "/api/session/:id/wizard",
            get(handlers::booking::get_wizard),
        )
        .route(
            "/api/session/:id/wizard/open",
            post(handlers::booking::open_wizard),
        )
        .route(
            "/api/session/:id/wizard/service",
            post(handlers::booking::wizard_toggle_service),
        )
        .route(
            "/api/session/:id/wizard/product",
            post(handlers::booking::wizard_adjust_product),
        )
        .route(
            "/api/session/:id/wizard/continue",
            post(handlers::booking::continue_to_staff),
        )
        .route("/api/session/:id/wizard/back", post(handlers::booking::back))
        .route(
            "/api/session/:id/wizard/staff",
            post(handlers::booking::choose_staff),
        )
        .route(
            "/api/session/:id/wizard/date",
            post(handlers::booking::pick_date),
        )
        .route(
            "/api/session/:id/wizard/time",
            post(handlers::booking::pick_time),
        )
        .route(
            "/api/session/:id/wizard/confirm",
            post(handlers::booking::confirm),
        )
        .route(
            "/api/session/:id/wizard/close",
            post(handlers::booking::close_wizard),
        )
        .route("/api/assistant", post(handlers::assistant::chat))
        .route(
            "/api/admin/appointments",
            get(handlers::admin::get_appointments),
        )
        .route("/api/admin/metrics", get(handlers::admin::get_metrics))
        .route("/api/admin/reset", post(handlers::admin::reset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
