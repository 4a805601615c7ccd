//! In-memory order store.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use orderdesk_core::{CompanyCode, DocumentTypeId, OrderId, VendorNumber};
use orderdesk_orders::{
    Company, DocumentType, LineItem, Order, ReferenceEntity, ReferenceKind, Vendor,
};

use crate::batch::{BatchOperation, BatchRequest, BatchResult, LineItemKey, OperationStatus};
use crate::r#trait::{OrderFilter, OrderStore, StoreError};

#[derive(Debug, Clone, Default)]
struct StoredOrder {
    header: Order,
    items: BTreeMap<u32, LineItem>,
}

#[derive(Debug, Default)]
struct State {
    orders: HashMap<OrderId, StoredOrder>,
    vendors: HashMap<VendorNumber, Vendor>,
    companies: HashMap<CompanyCode, Company>,
    document_types: HashMap<DocumentTypeId, DocumentType>,
}

/// In-memory implementation of [`OrderStore`].
///
/// Batches are applied all-or-nothing: every operation is validated against
/// current state first and nothing is committed unless all of them pass.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    state: RwLock<State>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vendor(&self, vendor: Vendor) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.vendors.insert(vendor.number.clone(), vendor);
        Ok(())
    }

    pub fn insert_company(&self, company: Company) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.companies.insert(company.code.clone(), company);
        Ok(())
    }

    pub fn insert_document_type(&self, document_type: DocumentType) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .document_types
            .insert(document_type.id.clone(), document_type);
        Ok(())
    }

    /// Read-side decoration: attach the current reference copies and the
    /// derived total over the stored items.
    fn decorate(state: &State, stored: &StoredOrder) -> Order {
        let mut header = stored.header.clone();
        header.vendor = header
            .vendor_number
            .as_ref()
            .and_then(|number| state.vendors.get(number).cloned());
        header.company = header
            .company_code
            .as_ref()
            .and_then(|code| state.companies.get(code).cloned());
        header.document_type = header
            .document_type_id
            .as_ref()
            .and_then(|id| state.document_types.get(id).cloned());
        header.total_amount = Some(stored.items.values().filter_map(|item| item.amount).sum());
        header
    }

    fn validate(state: &State, batch: &BatchRequest) -> BatchResult {
        let mut statuses = Vec::with_capacity(batch.len());

        if let Some(header) = &batch.header_upsert {
            let operation = BatchOperation::HeaderUpsert {
                order_id: header.id.clone(),
            };
            if header.id.is_empty() {
                statuses.push(OperationStatus::failed(operation, 400, "order id required"));
            } else if state.orders.contains_key(&header.id) {
                statuses.push(OperationStatus::ok(operation, 200));
            } else {
                statuses.push(OperationStatus::ok(operation, 201));
            }
        }

        for item in &batch.item_upserts {
            let operation = BatchOperation::ItemUpsert {
                order_id: item.parent_order_id.clone(),
                item_no: item.item_no,
            };
            match &item.parent_order_id {
                None => statuses.push(OperationStatus::failed(
                    operation,
                    400,
                    "parent order id required",
                )),
                Some(order_id) => {
                    let created_in_batch = batch
                        .header_upsert
                        .as_ref()
                        .is_some_and(|header| header.id == *order_id);
                    if !created_in_batch && !state.orders.contains_key(order_id) {
                        statuses.push(OperationStatus::failed(
                            operation,
                            404,
                            "parent order not found",
                        ));
                    } else {
                        let exists = state
                            .orders
                            .get(order_id)
                            .is_some_and(|o| o.items.contains_key(&item.item_no));
                        statuses.push(OperationStatus::ok(operation, if exists { 200 } else { 201 }));
                    }
                }
            }
        }

        for key in &batch.item_deletes {
            let operation = BatchOperation::ItemDelete { key: key.clone() };
            let exists = state
                .orders
                .get(&key.order_id)
                .is_some_and(|o| o.items.contains_key(&key.item_no));
            if exists {
                statuses.push(OperationStatus::ok(operation, 204));
            } else {
                statuses.push(OperationStatus::failed(operation, 404, "line item not found"));
            }
        }

        BatchResult { statuses }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Poisoned
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn fetch_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        let stored = state.orders.get(id).ok_or(StoreError::NotFound)?;
        Ok(Self::decorate(&state, stored))
    }

    async fn fetch_line_items(&self, order_id: &OrderId) -> Result<Vec<LineItem>, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        let stored = state.orders.get(order_id).ok_or(StoreError::NotFound)?;
        Ok(stored.items.values().cloned().collect())
    }

    async fn fetch_reference(
        &self,
        kind: ReferenceKind,
        key: &str,
    ) -> Result<ReferenceEntity, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        let entity = match kind {
            ReferenceKind::Vendor => state
                .vendors
                .get(&VendorNumber::new(key))
                .cloned()
                .map(ReferenceEntity::Vendor),
            ReferenceKind::Company => state
                .companies
                .get(&CompanyCode::new(key))
                .cloned()
                .map(ReferenceEntity::Company),
            ReferenceKind::DocumentType => state
                .document_types
                .get(&DocumentTypeId::new(key))
                .cloned()
                .map(ReferenceEntity::DocumentType),
        };
        entity.ok_or(StoreError::NotFound)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .map(|stored| Self::decorate(&state, stored))
            .filter(|order| filter.matches(order))
            .collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orders)
    }

    async fn submit_batch(&self, batch: BatchRequest) -> Result<BatchResult, StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;

        let result = Self::validate(&state, &batch);
        if !result.is_success() {
            tracing::debug!(ops = batch.len(), "batch rejected; nothing committed");
            return Ok(result);
        }

        let now = Utc::now();

        if let Some(header) = batch.header_upsert {
            let mut header = header;
            // Derived and denormalized fields are read-side only.
            header.total_amount = None;
            header.vendor = None;
            header.company = None;
            header.document_type = None;
            header.modified_at = Some(now);
            let entry = state.orders.entry(header.id.clone()).or_default();
            entry.header = header;
        }

        for item in batch.item_upserts {
            if let Some(order_id) = item.parent_order_id.clone() {
                state
                    .orders
                    .entry(order_id)
                    .or_default()
                    .items
                    .insert(item.item_no, item);
            }
        }

        for LineItemKey { order_id, item_no } in batch.item_deletes {
            if let Some(stored) = state.orders.get_mut(&order_id) {
                stored.items.remove(&item_no);
            }
        }

        tracing::debug!(ops = result.statuses.len(), "batch committed");
        Ok(result)
    }

    async fn reset_pending_changes(&self) -> Result<(), StoreError> {
        // Nothing is buffered client-side here.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_core::Money;

    fn item(order_id: &str, item_no: u32, quantity: i64, rate_major: i64) -> LineItem {
        let mut item = LineItem::new(item_no, Some(OrderId::new(order_id)));
        item.quantity = Some(quantity);
        item.rate = Some(Money::from_major(rate_major));
        item.recompute_amount();
        item
    }

    fn header(id: &str, description: &str) -> Order {
        Order {
            id: OrderId::new(id),
            description: description.to_string(),
            ..Order::draft()
        }
    }

    async fn seed_order(store: &InMemoryOrderStore, id: &str, description: &str) {
        let batch = BatchRequest {
            header_upsert: Some(header(id, description)),
            item_upserts: vec![item(id, 1, 2, 10), item(id, 2, 1, 5)],
            item_deletes: vec![],
        };
        assert!(store.submit_batch(batch).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn fetch_decorates_total_and_references() {
        let store = InMemoryOrderStore::new();
        store
            .insert_vendor(Vendor {
                number: VendorNumber::new("V100"),
                description: "Acme Industrial".to_string(),
            })
            .unwrap();

        let mut h = header("PO-1", "spares");
        h.vendor_number = Some(VendorNumber::new("V100"));
        let batch = BatchRequest {
            header_upsert: Some(h),
            item_upserts: vec![item("PO-1", 1, 2, 10)],
            item_deletes: vec![],
        };
        assert!(store.submit_batch(batch).await.unwrap().is_success());

        let order = store.fetch_order(&OrderId::new("PO-1")).await.unwrap();
        assert_eq!(order.total_amount, Some(Money::from_major(20)));
        assert_eq!(order.vendor.unwrap().description, "Acme Industrial");
        assert!(order.modified_at.is_some());
    }

    #[tokio::test]
    async fn fetch_missing_order_is_not_found() {
        let store = InMemoryOrderStore::new();
        assert_eq!(
            store.fetch_order(&OrderId::new("PO-404")).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(
            store.fetch_line_items(&OrderId::new("PO-404")).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn rejected_batch_commits_nothing() {
        let store = InMemoryOrderStore::new();
        seed_order(&store, "PO-1", "spares").await;

        // Valid header update plus a delete of a row that does not exist.
        let batch = BatchRequest {
            header_upsert: Some(header("PO-1", "renamed")),
            item_upserts: vec![],
            item_deletes: vec![LineItemKey {
                order_id: OrderId::new("PO-1"),
                item_no: 9,
            }],
        };
        let result = store.submit_batch(batch).await.unwrap();
        assert!(!result.is_success());
        assert_eq!(result.first_failure().unwrap().code, 404);

        let order = store.fetch_order(&OrderId::new("PO-1")).await.unwrap();
        assert_eq!(order.description, "spares");
    }

    #[tokio::test]
    async fn item_upsert_requires_known_parent() {
        let store = InMemoryOrderStore::new();

        let orphan = BatchRequest {
            header_upsert: None,
            item_upserts: vec![item("PO-9", 1, 1, 1)],
            item_deletes: vec![],
        };
        let result = store.submit_batch(orphan).await.unwrap();
        assert_eq!(result.first_failure().unwrap().code, 404);

        let mut parentless = LineItem::new(1, None);
        parentless.quantity = Some(1);
        let batch = BatchRequest {
            header_upsert: None,
            item_upserts: vec![parentless],
            item_deletes: vec![],
        };
        let result = store.submit_batch(batch).await.unwrap();
        assert_eq!(result.first_failure().unwrap().code, 400);

        // A parent created by the same batch is fine.
        let combined = BatchRequest {
            header_upsert: Some(header("PO-9", "new")),
            item_upserts: vec![item("PO-9", 1, 1, 1)],
            item_deletes: vec![],
        };
        assert!(store.submit_batch(combined).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn header_upsert_requires_id() {
        let store = InMemoryOrderStore::new();
        let batch = BatchRequest {
            header_upsert: Some(Order::draft()),
            item_upserts: vec![],
            item_deletes: vec![],
        };
        let result = store.submit_batch(batch).await.unwrap();
        assert_eq!(result.first_failure().unwrap().code, 400);
    }

    #[tokio::test]
    async fn list_orders_applies_filters() {
        let store = InMemoryOrderStore::new();
        seed_order(&store, "PO-1", "Replacement parts").await;
        seed_order(&store, "PO-2", "Office supplies").await;

        let all = store.list_orders(&OrderFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, OrderId::new("PO-1"));

        let by_id = OrderFilter {
            id: Some(OrderId::new("PO-2")),
            ..OrderFilter::default()
        };
        let found = store.list_orders(&by_id).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, OrderId::new("PO-2"));

        let by_description = OrderFilter {
            description_contains: Some("replacement".to_string()),
            ..OrderFilter::default()
        };
        let found = store.list_orders(&by_description).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, OrderId::new("PO-1"));
    }

    #[tokio::test]
    async fn delete_removes_row_and_total_follows() {
        let store = InMemoryOrderStore::new();
        seed_order(&store, "PO-1", "spares").await;

        let batch = BatchRequest {
            header_upsert: None,
            item_upserts: vec![],
            item_deletes: vec![LineItemKey {
                order_id: OrderId::new("PO-1"),
                item_no: 1,
            }],
        };
        assert!(store.submit_batch(batch).await.unwrap().is_success());

        let items = store.fetch_line_items(&OrderId::new("PO-1")).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_no, 2);

        let order = store.fetch_order(&OrderId::new("PO-1")).await.unwrap();
        assert_eq!(order.total_amount, Some(Money::from_major(5)));
    }

    #[tokio::test]
    async fn missing_reference_is_not_found() {
        let store = InMemoryOrderStore::new();
        assert_eq!(
            store.fetch_reference(ReferenceKind::Vendor, "V999").await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn poisoned_lock_surfaces_as_error() {
        let store = std::sync::Arc::new(InMemoryOrderStore::new());

        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.state.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        let result = store.insert_vendor(Vendor {
            number: VendorNumber::new("V1"),
            description: String::new(),
        });
        assert_eq!(result, Err(StoreError::Poisoned));
        assert_eq!(
            store.fetch_order(&OrderId::new("PO-1")).await,
            Err(StoreError::Poisoned)
        );
    }
}
