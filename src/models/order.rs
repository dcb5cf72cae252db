use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// The five stages a commission moves through, from intake to handover.
///
/// Wire form is kebab-case (`in-progress`), matching what the dashboard and
/// the stored documents use.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Measuring,
    InProgress,
    Completed,
    Delivered,
}

impl OrderStatus {
    /// Terminal statuses: the garment has left the workshop.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }
}

/// A single customer commission.
///
/// `id` is assigned by the store on creation and immutable thereafter.
/// `created_at` is set once; `updated_at` moves forward on every mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    /// Garment type, e.g. "wedding-dress" or "Formal Suit".
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fabric: Option<String>,
    /// Body-part name -> inches. Keys are unique by construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<BTreeMap<String, Decimal>>,
    pub status: OrderStatus,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new order. The store assigns id and
/// timestamps; status defaults to `Pending` when unspecified.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDraft {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub item: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fabric: Option<String>,
    #[serde(default)]
    pub measurements: Option<BTreeMap<String, Decimal>>,
    #[serde(default = "default_status")]
    pub status: OrderStatus,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn default_status() -> OrderStatus {
    OrderStatus::Pending
}

impl OrderDraft {
    /// Pure validation predicate. Callers must not persist a draft this
    /// function rejects; the error names the offending field.
    pub fn validate(&self) -> Result<(), ServiceError> {
        require_non_empty("customer_id", &self.customer_id)?;
        require_non_empty("customer_name", &self.customer_name)?;
        require_non_empty("customer_email", &self.customer_email)?;
        require_non_empty("item", &self.item)?;
        validate_amount(self.amount)?;
        if let Some(measurements) = &self.measurements {
            for (part, inches) in measurements {
                if inches.is_sign_negative() {
                    return Err(ServiceError::validation(
                        "measurements",
                        format!("`{part}` must be a non-negative number of inches"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Amounts are currency values and may never go negative. `Decimal` is finite
/// by construction, so no NaN/infinity check is needed.
pub fn validate_amount(amount: Decimal) -> Result<(), ServiceError> {
    if amount.is_sign_negative() {
        return Err(ServiceError::validation(
            "amount",
            "must be a non-negative amount",
        ));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, "must not be empty"));
    }
    Ok(())
}
