use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::errors::ServiceError;
use crate::models::{Order, OrderDraft, OrderStatus};

pub mod memory;

pub use memory::InMemoryOrderStore;

/// Partial update merged field-by-field into an existing order. Absent fields
/// are left untouched; `updated_at` always moves forward on merge.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub amount: Option<Decimal>,
    pub item: Option<String>,
    pub description: Option<String>,
    pub fabric: Option<String>,
    pub measurements: Option<BTreeMap<String, Decimal>>,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}

/// Full collection at a point in time, ordered by `created_at` descending.
/// `revision` increases by one per mutation and lets subscribers drop any
/// stale delivery that raced a newer one.
#[derive(Clone, Debug)]
pub struct OrderSnapshot {
    pub revision: u64,
    pub orders: Vec<Order>,
}

/// Callback invoked with the full ordered collection on every change.
pub type SnapshotCallback = Box<dyn Fn(Vec<Order>) + Send + Sync>;

/// Cancellation handle for a standing watch. Dropping it (or calling
/// [`cancel`](Subscription::cancel)) stops delivery and releases the
/// underlying watch task.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Stops delivery. No callback invocation happens after this returns
    /// and the watch resource is released.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The sole boundary to persistent order storage.
///
/// Semantics follow a document store: opaque string ids assigned on create,
/// field-level merge on update, and a standing watch that pushes the full
/// ordered collection to every subscriber on any change.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order with `created_at = updated_at = now` and a
    /// store-assigned id. Store failures surface as `Persistence` unchanged.
    async fn create(&self, draft: OrderDraft) -> Result<Order, ServiceError>;

    /// Fails with `NotFound` if the id is absent.
    async fn get(&self, id: &str) -> Result<Order, ServiceError>;

    /// Merges `patch` into the existing record and stamps a new `updated_at`
    /// strictly greater than the previous one. `NotFound` if absent.
    async fn update(&self, id: &str, patch: OrderPatch) -> Result<Order, ServiceError>;

    /// Fails with `NotFound` if the id is absent.
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// All orders, newest first.
    async fn fetch_all(&self) -> Result<Vec<Order>, ServiceError>;

    /// Same ordering, filtered by status.
    async fn fetch_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ServiceError>;

    /// Establishes a standing watch. The callback fires once with the current
    /// collection, then once per mutation by any actor. Multiple concurrent
    /// subscribers are supported; each gets its own handle.
    fn subscribe(&self, callback: SnapshotCallback) -> Subscription;

    /// Raw snapshot feed for streaming consumers (SSE). Receivers observe the
    /// same monotonic revision ordering as callback subscribers.
    fn watch(&self) -> broadcast::Receiver<OrderSnapshot>;
}
