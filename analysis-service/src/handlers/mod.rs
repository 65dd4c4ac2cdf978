//! HTTP handlers for analysis-service.

pub mod analyze;
pub mod health;
pub mod metrics;
pub mod routing;

pub use analyze::analyze;
pub use health::health_check;
pub use metrics::metrics;
pub use routing::{analyze_method_not_allowed, health_method_not_allowed, not_found};
