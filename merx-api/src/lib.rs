pub mod error;
pub mod orders;
pub mod pricing;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/orders", post(orders::create_order).get(orders::list_orders))
        .route("/v1/orders/{id}", get(orders::get_order))
        .route("/v1/products/{id}/price", get(pricing::get_price))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
