use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use futures::Stream;
use tokio::sync::broadcast;

use crate::analytics::DashboardSnapshot;
use crate::{ApiResponse, AppState};

/// All derived dashboard views, recomputed from the current collection.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardSnapshot)
    ),
    tag = "dashboard"
)]
pub async fn dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardSnapshot>> {
    let orders = state.orders.list_orders().await;
    Json(ApiResponse::new(DashboardSnapshot::compute(
        &orders,
        Utc::now(),
    )))
}

/// Server-sent stream of the live order collection: one `orders` event per
/// mutation, full collection each time, newest first. Dropping the connection
/// releases the watch.
#[utoipa::path(
    get,
    path = "/api/v1/orders/stream",
    responses(
        (status = 200, description = "SSE stream of order snapshots")
    ),
    tag = "dashboard"
)]
pub async fn stream_orders(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.store.watch();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if let Ok(event) = SseEvent::default()
                        .event("orders")
                        .id(snapshot.revision.to_string())
                        .json_data(&snapshot.orders)
                    {
                        return Some((Ok(event), rx));
                    }
                }
                // A lagged receiver resumes at a newer revision; skipped
                // snapshots were already superseded.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
