use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::models::{Order, OrderDraft, OrderStatus};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Optional status filter, e.g. `in-progress`.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "measuring")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAmountRequest {
    pub amount: Decimal,
}

/// Create a new order.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = OrderDraft,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(draft): Json<OrderDraft>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.orders.create_order(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(order))))
}

/// List orders, newest first, optionally filtered by status. A store outage
/// degrades to an empty list so the dashboard keeps rendering.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListParams),
    responses(
        (status = 200, description = "Orders returned", body = [Order]),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ServiceError> {
    let orders = match params.status {
        Some(raw) => {
            let status = OrderStatus::from_str(&raw)
                .map_err(|_| ServiceError::InvalidStatus(format!("unknown order status: {raw}")))?;
            state.orders.list_orders_by_status(status).await
        }
        None => state.orders.list_orders().await,
    };
    Ok(Json(ApiResponse::new(orders)))
}

/// Fetch a single order.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order returned", body = Order),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.orders.get_order(&id).await?;
    Ok(Json(ApiResponse::new(order)))
}

/// Move an order to a new status, subject to the configured transition policy.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Transition not allowed", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.orders.change_status(&id, &req.status).await?;
    Ok(Json(ApiResponse::new(order)))
}

/// Replace the order's notes.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/notes",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateNotesRequest,
    responses(
        (status = 200, description = "Notes updated", body = Order),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_notes(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.orders.annotate(&id, req.notes).await?;
    Ok(Json(ApiResponse::new(order)))
}

/// Reprice the order.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/amount",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateAmountRequest,
    responses(
        (status = 200, description = "Amount updated", body = Order),
        (status = 400, description = "Negative amount", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_amount(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateAmountRequest>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.orders.reprice(&id, req.amount).await?;
    Ok(Json(ApiResponse::new(order)))
}

/// Delete an order.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.orders.delete_order(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
