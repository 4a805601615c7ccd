//! Data-access layer: the order store contract, batch types, and an
//! in-memory implementation for tests/dev.

pub mod batch;
pub mod in_memory;
pub mod r#trait;

pub use batch::{BatchOperation, BatchRequest, BatchResult, LineItemKey, OperationStatus};
pub use in_memory::InMemoryOrderStore;
pub use r#trait::{OrderFilter, OrderStore, StoreError};
