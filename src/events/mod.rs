use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::models::OrderStatus;
use crate::notifications::Notifier;

/// Events emitted by the lifecycle service after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: String,
        customer_name: String,
        item: String,
    },
    OrderStatusChanged {
        order_id: String,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderUpdated {
        order_id: String,
    },
    OrderDeleted {
        order_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Best-effort send; a full or closed channel never fails the operation
    /// that produced the event.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!(error = %e, "event channel closed; dropping event");
        }
    }
}

/// Creates the event channel and its sender half.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Consumes events and forwards user-visible ones to the push notifier.
/// Delivery is best-effort: a transport failure is logged, never retried.
pub async fn process_events(
    mut rx: mpsc::Receiver<Event>,
    notifier: Arc<dyn Notifier>,
    notify_token: Option<String>,
) {
    info!("starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated {
                order_id,
                customer_name,
                item,
            } => {
                info!(%order_id, %customer_name, "order created");
                if let Some(token) = &notify_token {
                    let body = format!("New order from {customer_name}: {item}");
                    if let Err(e) = notifier.send(token, "New order", &body, None).await {
                        warn!(error = %e, %order_id, "failed to push order-created notification");
                    }
                }
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
                if let Some(token) = &notify_token {
                    let body = format!("Order {order_id} moved from {old_status} to {new_status}");
                    if let Err(e) = notifier.send(token, "Order update", &body, None).await {
                        warn!(error = %e, %order_id, "failed to push status-change notification");
                    }
                }
            }
            Event::OrderUpdated { order_id } => {
                info!(%order_id, "order updated");
            }
            Event::OrderDeleted { order_id } => {
                info!(%order_id, "order deleted");
            }
        }
    }

    warn!("event processing loop has ended");
}
