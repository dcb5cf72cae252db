pub mod orders;
pub mod transitions;

pub use orders::OrderLifecycleService;
pub use transitions::{Permissive, Sequential, TransitionPolicy};
