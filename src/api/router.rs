use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::routes::{agent, chat, products, suppliers};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Catalog
        .route(
            "/suppliers",
            post(suppliers::create_supplier).get(suppliers::list_suppliers),
        )
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        // LLM endpoints
        .route("/chat", post(chat::chat))
        .route("/sql-agent", post(agent::run_sql_agent))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
