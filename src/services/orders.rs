use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, instrument};

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{order::validate_amount, Order, OrderDraft, OrderStatus};
use crate::store::{OrderPatch, OrderStore};

use super::transitions::TransitionPolicy;

/// The only writer of order state, mediating between the UI and the store.
/// Validates before every store call and passes the error taxonomy upward
/// unchanged.
#[derive(Clone)]
pub struct OrderLifecycleService {
    store: Arc<dyn OrderStore>,
    event_sender: Option<EventSender>,
    policy: Arc<dyn TransitionPolicy>,
}

impl OrderLifecycleService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        event_sender: Option<EventSender>,
        policy: Arc<dyn TransitionPolicy>,
    ) -> Self {
        Self {
            store,
            event_sender,
            policy,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send(event).await;
        }
    }

    /// Validates the draft and persists it. A validation failure never
    /// reaches the store.
    #[instrument(skip(self, draft), fields(customer_id = %draft.customer_id))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Order, ServiceError> {
        draft.validate()?;
        let order = self.store.create(draft).await?;
        info!(order_id = %order.id, "order created");

        self.emit(Event::OrderCreated {
            order_id: order.id.clone(),
            customer_name: order.customer_name.clone(),
            item: order.item.clone(),
        })
        .await;

        Ok(order)
    }

    /// Parses the requested status, checks it against the transition policy
    /// and applies it. The policy is the single place a stricter state
    /// machine plugs in.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn change_status(
        &self,
        order_id: &str,
        new_status: &str,
    ) -> Result<Order, ServiceError> {
        let status = OrderStatus::from_str(new_status)
            .map_err(|_| ServiceError::InvalidStatus(format!("unknown order status: {new_status}")))?;

        let current = self.store.get(order_id).await?;
        self.policy.check(current.status, status)?;

        let updated = self
            .store
            .update(order_id, OrderPatch::status(status))
            .await?;
        info!(order_id = %order_id, old_status = %current.status, "order status updated");

        self.emit(Event::OrderStatusChanged {
            order_id: order_id.to_string(),
            old_status: current.status,
            new_status: status,
        })
        .await;

        Ok(updated)
    }

    /// Replaces the order's notes.
    #[instrument(skip(self, notes), fields(order_id = %order_id))]
    pub async fn annotate(&self, order_id: &str, notes: String) -> Result<Order, ServiceError> {
        let updated = self.store.update(order_id, OrderPatch::notes(notes)).await?;
        self.emit(Event::OrderUpdated {
            order_id: order_id.to_string(),
        })
        .await;
        Ok(updated)
    }

    /// Sets a new amount after re-checking it is non-negative.
    #[instrument(skip(self), fields(order_id = %order_id, amount = %amount))]
    pub async fn reprice(&self, order_id: &str, amount: Decimal) -> Result<Order, ServiceError> {
        validate_amount(amount)?;
        let updated = self
            .store
            .update(order_id, OrderPatch::amount(amount))
            .await?;
        self.emit(Event::OrderUpdated {
            order_id: order_id.to_string(),
        })
        .await;
        Ok(updated)
    }

    /// Removes the order. Only existence is validated.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: &str) -> Result<(), ServiceError> {
        self.store.delete(order_id).await?;
        info!(order_id = %order_id, "order deleted");
        self.emit(Event::OrderDeleted {
            order_id: order_id.to_string(),
        })
        .await;
        Ok(())
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, ServiceError> {
        self.store.get(order_id).await
    }

    /// All orders, newest first. A store failure degrades to an empty list
    /// with a logged error; the dashboard renders rather than crashes.
    pub async fn list_orders(&self) -> Vec<Order> {
        match self.store.fetch_all().await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "failed to fetch orders; serving empty collection");
                Vec::new()
            }
        }
    }

    /// Same degradation as [`list_orders`](Self::list_orders), filtered.
    pub async fn list_orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        match self.store.fetch_by_status(status).await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, %status, "failed to fetch orders by status; serving empty collection");
                Vec::new()
            }
        }
    }
}
