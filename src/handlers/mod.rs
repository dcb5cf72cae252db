use axum::{
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};

use crate::AppState;

pub mod dashboard;
pub mod orders;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route(
            "/api/v1/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/v1/orders/stream", get(dashboard::stream_orders))
        .route(
            "/api/v1/orders/:id",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/api/v1/orders/:id/status", put(orders::update_status))
        .route("/api/v1/orders/:id/notes", put(orders::update_notes))
        .route("/api/v1/orders/:id/amount", put(orders::update_amount))
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(crate::openapi::ApiDoc::openapi())
}
