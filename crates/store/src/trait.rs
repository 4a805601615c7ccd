use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderdesk_core::{CompanyCode, DocumentTypeId, OrderId, VendorNumber};
use orderdesk_orders::{LineItem, Order, ReferenceEntity, ReferenceKind};

use crate::batch::{BatchRequest, BatchResult};

/// Store operation error.
///
/// These are **infrastructure errors** (missing rows, transport, lock state)
/// as opposed to domain errors (validation, invariants). Per-operation batch
/// rejections are reported through [`BatchResult`], not through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("backend failure: {0}")]
    Backend(String),

    /// A shared-state lock was poisoned by a panicking holder.
    #[error("lock poisoned")]
    Poisoned,
}

/// Filter for the order list.
///
/// Key fields match exactly, the description matches by (case-insensitive)
/// substring. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub id: Option<OrderId>,
    pub vendor_number: Option<VendorNumber>,
    pub company_code: Option<CompanyCode>,
    pub document_type_id: Option<DocumentTypeId>,
    pub description_contains: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(id) = &self.id
            && order.id != *id
        {
            return false;
        }
        if let Some(number) = &self.vendor_number
            && order.vendor_number.as_ref() != Some(number)
        {
            return false;
        }
        if let Some(code) = &self.company_code
            && order.company_code.as_ref() != Some(code)
        {
            return false;
        }
        if let Some(doc_type) = &self.document_type_id
            && order.document_type_id.as_ref() != Some(doc_type)
        {
            return false;
        }
        if let Some(needle) = &self.description_contains
            && !order
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }
        true
    }
}

/// Remote system of record for purchase orders.
///
/// Minimal contract the draft session depends on; implementations decide
/// transport. The session assumes:
/// - reads attach the denormalized reference copies and the derived
///   `total_amount`
/// - `submit_batch` is all-or-nothing: a batch containing any failed
///   operation leaves the store untouched, with the mixed per-operation
///   outcome reported in the returned [`BatchResult`]
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn fetch_order(&self, id: &OrderId) -> Result<Order, StoreError>;

    /// Line items of one order, in `item_no` order.
    async fn fetch_line_items(&self, order_id: &OrderId) -> Result<Vec<LineItem>, StoreError>;

    async fn fetch_reference(
        &self,
        kind: ReferenceKind,
        key: &str,
    ) -> Result<ReferenceEntity, StoreError>;

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    async fn submit_batch(&self, batch: BatchRequest) -> Result<BatchResult, StoreError>;

    /// Discard any buffered-but-unsent local mutations. A no-op for stores
    /// that keep no client-side buffer.
    async fn reset_pending_changes(&self) -> Result<(), StoreError>;
}
