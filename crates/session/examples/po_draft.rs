//! End-to-end walkthrough: draft a purchase order against the in-memory
//! store, then reopen it for an edit.
//!
//! Run with `cargo run -p orderdesk-session --example po_draft`.

use std::sync::Arc;

use orderdesk_core::{Money, OrderId, VendorNumber};
use orderdesk_orders::Vendor;
use orderdesk_session::{LineItemUpdate, Session};
use orderdesk_store::{InMemoryOrderStore, OrderStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    orderdesk_observability::init();

    let store = Arc::new(InMemoryOrderStore::new());
    store.insert_vendor(Vendor {
        number: VendorNumber::new("V100"),
        description: "Acme Industrial".to_string(),
    })?;

    let mut session = Session::new(store.clone());

    // Create flow.
    session.begin_create();
    session.set_order_id(OrderId::new("PO-1"))?;
    session.set_description("Replacement parts")?;
    let lookup = session.set_vendor(VendorNumber::new("V100"))?;
    if session.refresh_reference(&lookup).await.is_err() {
        tracing::warn!("vendor details unavailable; continuing without them");
    }
    session.add_line_item(Some(2), Some(Money::from_major(10)))?;
    session.add_line_item(Some(1), Some(Money::from_major(5)))?;
    tracing::info!(total = %session.total_amount(), "draft total");
    session.save().await?;

    // Edit flow: bump a quantity, then save again.
    session.begin_edit(&OrderId::new("PO-1")).await?;
    session.update_line_item(
        1,
        LineItemUpdate {
            quantity: Some(4),
            rate: None,
        },
    )?;
    session.save().await?;

    let order = store.fetch_order(&OrderId::new("PO-1")).await?;
    tracing::info!(
        order = %order.id,
        total = %order.total_amount.unwrap_or(Money::ZERO),
        "persisted"
    );
    Ok(())
}
