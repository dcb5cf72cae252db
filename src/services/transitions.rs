use crate::errors::ServiceError;
use crate::models::OrderStatus;

/// Single seam for status-transition policy. The observed dashboard behavior
/// allows any transition; a strict workshop sequence is available behind the
/// same trait so the choice is a construction-time decision, not a call-site
/// rewrite.
pub trait TransitionPolicy: Send + Sync {
    fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), ServiceError>;
}

/// Any status may be set to any other. The default.
pub struct Permissive;

impl TransitionPolicy for Permissive {
    fn check(&self, _from: OrderStatus, _to: OrderStatus) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Strict workshop sequence: pending -> measuring -> in-progress ->
/// {completed, delivered}. Re-asserting the current status is a no-op.
pub struct Sequential;

impl TransitionPolicy for Sequential {
    fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), ServiceError> {
        if from == to {
            return Ok(());
        }
        let allowed = match from {
            OrderStatus::Pending => matches!(to, OrderStatus::Measuring),
            OrderStatus::Measuring => matches!(to, OrderStatus::InProgress),
            OrderStatus::InProgress => to.is_terminal(),
            OrderStatus::Completed | OrderStatus::Delivered => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(ServiceError::InvalidTransition(format!("{from} -> {to}")))
        }
    }
}
