// ABOUTME: Order lifecycle for Storefront
// ABOUTME: Submission and persistence, status transitions, history queries and guest-order linking

pub mod error;
pub mod status;
pub mod storage;
pub mod writer;

pub use error::OrderError;
pub use status::{CancellationPolicy, OrderStatusMachine};
pub use storage::{OrderFilter, OrderStorage};
pub use writer::{OrderReceipt, OrderWriter};
