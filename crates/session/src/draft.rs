//! Draft bookkeeping wrappers around the wire records.
//!
//! Lifecycle markers (transient, dirty, pending delete) are a client-side
//! concern; the store only ever sees plain [`Order`]/[`LineItem`] records.

use orderdesk_core::Money;
use orderdesk_orders::{LineItem, Order};

/// The order header under edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrder {
    pub(crate) order: Order,
    /// Exists only client-side; no server identity yet.
    pub(crate) transient: bool,
    pub(crate) dirty: bool,
}

impl DraftOrder {
    pub(crate) fn transient() -> Self {
        Self {
            order: Order::draft(),
            transient: true,
            dirty: false,
        }
    }

    pub(crate) fn persisted(order: Order) -> Self {
        Self {
            order,
            transient: false,
            dirty: false,
        }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// One visible row of the items table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub(crate) item: LineItem,
    pub(crate) transient: bool,
    /// Marked for removal, reversible until save. The row stays visible but
    /// is excluded from the running total.
    pub(crate) pending_delete: bool,
    pub(crate) dirty: bool,
}

impl DraftLine {
    pub(crate) fn transient(item: LineItem) -> Self {
        Self {
            item,
            transient: true,
            pending_delete: false,
            dirty: false,
        }
    }

    /// Wrap a loaded row; a missing stored amount is recomputed from the
    /// factors so observers never see an unsettled row.
    pub(crate) fn persisted(mut item: LineItem) -> Self {
        if item.amount.is_none() {
            item.recompute_amount();
        }
        Self {
            item,
            transient: false,
            pending_delete: false,
            dirty: false,
        }
    }

    pub fn item(&self) -> &LineItem {
        &self.item
    }

    pub fn item_no(&self) -> u32 {
        self.item.item_no
    }

    pub fn amount(&self) -> Option<Money> {
        self.item.amount
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn is_pending_delete(&self) -> bool {
        self.pending_delete
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
