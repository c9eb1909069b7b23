pub mod builder;
pub mod error;
pub mod metrics;
pub mod service;

pub use builder::PantryServiceBuilder;
pub use error::ServiceError;
pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use service::PantryService;
