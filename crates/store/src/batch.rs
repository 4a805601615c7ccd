//! Deferred change group: mutations accumulated client-side and submitted
//! together as one logical batch.

use serde::{Deserialize, Serialize};

use orderdesk_core::OrderId;
use orderdesk_orders::{LineItem, Order};

/// Key of one line item row (order + sequence number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemKey {
    pub order_id: OrderId,
    pub item_no: u32,
}

/// All mutations of one save, submitted as a unit.
///
/// Rows that only ever existed client-side and were dropped before the save
/// never appear here, not even as deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub header_upsert: Option<Order>,
    pub item_upserts: Vec<LineItem>,
    pub item_deletes: Vec<LineItemKey>,
}

impl BatchRequest {
    /// Number of operations in the batch.
    pub fn len(&self) -> usize {
        usize::from(self.header_upsert.is_some()) + self.item_upserts.len() + self.item_deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a single batched operation targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOperation {
    HeaderUpsert {
        order_id: OrderId,
    },
    ItemUpsert {
        /// Absent when the submitted row itself lacked a parent id.
        order_id: Option<OrderId>,
        item_no: u32,
    },
    ItemDelete {
        key: LineItemKey,
    },
}

/// Outcome of one operation within a submitted batch.
///
/// Codes follow HTTP conventions; anything `>= 400` is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub operation: BatchOperation,
    pub code: u16,
    pub message: Option<String>,
}

impl OperationStatus {
    pub fn ok(operation: BatchOperation, code: u16) -> Self {
        Self {
            operation,
            code,
            message: None,
        }
    }

    pub fn failed(operation: BatchOperation, code: u16, message: impl Into<String>) -> Self {
        Self {
            operation,
            code,
            message: Some(message.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.code >= 400
    }
}

/// Per-operation outcome of a submitted batch, in submission order
/// (header upsert, then item upserts, then item deletes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub statuses: Vec<OperationStatus>,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.statuses.iter().all(|s| !s.is_failure())
    }

    pub fn first_failure(&self) -> Option<&OperationStatus> {
        self.statuses.iter().find(|s| s.is_failure())
    }
}
