use utoipa::OpenApi;

use crate::analytics::{
    DashboardSnapshot, DashboardStats, MonthlyRevenue, PopularItem, StatusSlice,
};
use crate::errors::ErrorResponse;
use crate::handlers::orders::{UpdateAmountRequest, UpdateNotesRequest, UpdateStatusRequest};
use crate::models::{Order, OrderDraft, OrderStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        description = "Order lifecycle, live order feed, and dashboard analytics for a tailoring studio."
    ),
    paths(
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_status,
        crate::handlers::orders::update_notes,
        crate::handlers::orders::update_amount,
        crate::handlers::orders::delete_order,
        crate::handlers::dashboard::dashboard,
        crate::handlers::dashboard::stream_orders,
    ),
    components(schemas(
        Order,
        OrderDraft,
        OrderStatus,
        UpdateStatusRequest,
        UpdateNotesRequest,
        UpdateAmountRequest,
        DashboardSnapshot,
        DashboardStats,
        StatusSlice,
        PopularItem,
        MonthlyRevenue,
        ErrorResponse,
    )),
    tags(
        (name = "orders", description = "Order lifecycle operations"),
        (name = "dashboard", description = "Derived analytics and the live feed")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds_and_lists_order_routes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let paths = json["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/orders"));
        assert!(paths.contains_key("/api/v1/orders/{id}/status"));
        assert!(paths.contains_key("/api/v1/dashboard"));
    }
}
