use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{Order, OrderDraft, OrderStatus};

use super::{OrderPatch, OrderSnapshot, OrderStore, SnapshotCallback, Subscription};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// In-memory document store with the same watch contract as the managed
/// backend it stands in for: every mutation publishes the full collection,
/// newest first, tagged with a monotonically increasing revision.
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<StoreInner>>,
    publisher: broadcast::Sender<OrderSnapshot>,
}

struct StoreInner {
    orders: HashMap<String, Order>,
    revision: u64,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        let (publisher, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                orders: HashMap::new(),
                revision: 0,
            })),
            publisher,
        }
    }

    /// Builds the ordered view and publishes it. Must be called with the
    /// write lock held so revisions reach the channel in order.
    fn publish(&self, inner: &mut StoreInner) {
        inner.revision += 1;
        let snapshot = OrderSnapshot {
            revision: inner.revision,
            orders: sorted(inner.orders.values().cloned().collect()),
        };
        // No receivers is fine; the collection simply has no watchers yet.
        let _ = self.publisher.send(snapshot);
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    #[instrument(skip(self, draft), fields(customer_id = %draft.customer_id))]
    async fn create(&self, draft: OrderDraft) -> Result<Order, ServiceError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: draft.customer_id,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            item: draft.item,
            description: draft.description,
            fabric: draft.fabric,
            measurements: draft.measurements,
            status: draft.status,
            amount: draft.amount,
            notes: draft.notes,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner.orders.insert(order.id.clone(), order.clone());
        self.publish(&mut inner);
        debug!(order_id = %order.id, "order persisted");
        Ok(order)
    }

    async fn get(&self, id: &str) -> Result<Order, ServiceError> {
        let inner = self.inner.read().await;
        inner
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {id} not found")))
    }

    #[instrument(skip(self, patch), fields(order_id = %id))]
    async fn update(&self, id: &str, patch: OrderPatch) -> Result<Order, ServiceError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("Order with ID {id} not found")))?;

        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(amount) = patch.amount {
            order.amount = amount;
        }
        if let Some(item) = patch.item {
            order.item = item;
        }
        if let Some(description) = patch.description {
            order.description = Some(description);
        }
        if let Some(fabric) = patch.fabric {
            order.fabric = Some(fabric);
        }
        if let Some(measurements) = patch.measurements {
            order.measurements = Some(measurements);
        }
        if let Some(notes) = patch.notes {
            order.notes = Some(notes);
        }
        if let Some(due_date) = patch.due_date {
            order.due_date = Some(due_date);
        }

        // `updated_at` must be strictly monotonic even if the wall clock has
        // not ticked since the last write.
        let now = Utc::now();
        order.updated_at = if now > order.updated_at {
            now
        } else {
            order.updated_at + chrono::Duration::microseconds(1)
        };

        let updated = order.clone();
        self.publish(&mut inner);
        Ok(updated)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let mut inner = self.inner.write().await;
        if inner.orders.remove(id).is_none() {
            return Err(ServiceError::NotFound(format!(
                "Order with ID {id} not found"
            )));
        }
        self.publish(&mut inner);
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Order>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(sorted(inner.orders.values().cloned().collect()))
    }

    async fn fetch_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(sorted(
            inner
                .orders
                .values()
                .filter(|o| o.status == status)
                .cloned()
                .collect(),
        ))
    }

    fn subscribe(&self, callback: SnapshotCallback) -> Subscription {
        // Register with the channel before reading the initial snapshot so
        // no mutation can fall between the two; the revision check below
        // drops anything the initial read already covered.
        let mut rx = self.publisher.subscribe();
        let inner = self.inner.clone();

        let task = tokio::spawn(async move {
            let mut last_revision = {
                let guard = inner.read().await;
                let orders = sorted(guard.orders.values().cloned().collect());
                let revision = guard.revision;
                drop(guard);
                callback(orders);
                revision
            };

            loop {
                match rx.recv().await {
                    Ok(snapshot) => {
                        if snapshot.revision <= last_revision {
                            continue;
                        }
                        last_revision = snapshot.revision;
                        callback(snapshot.orders);
                    }
                    // A lagged receiver picks back up at a newer revision;
                    // intermediate snapshots are safely superseded.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "subscriber lagged; resuming at newer snapshot");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription::new(task)
    }

    fn watch(&self) -> broadcast::Receiver<OrderSnapshot> {
        self.publisher.subscribe()
    }
}
