pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod repository;

pub use models::{BulkOrderOutcome, BulkOrderResult, Order, OrderError, OrderLine, OrderStatus};
pub use orchestrator::OrderOrchestrator;
