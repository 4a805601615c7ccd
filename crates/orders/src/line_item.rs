use serde::{Deserialize, Serialize};

use orderdesk_core::{Entity, Money, OrderId};

/// One row of a purchase order.
///
/// `item_no` is a sequence number unique within its order; numbers freed by
/// deletion are never reassigned. `parent_order_id` may be absent while the
/// row lives inside a draft whose header id is not settled yet; it is
/// backfilled no later than save time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_no: u32,
    pub parent_order_id: Option<OrderId>,
    pub quantity: Option<i64>,
    pub rate: Option<Money>,
    /// Derived `quantity × rate`; present only when both factors are.
    pub amount: Option<Money>,
}

impl LineItem {
    pub fn new(item_no: u32, parent_order_id: Option<OrderId>) -> Self {
        Self {
            item_no,
            parent_order_id,
            ..Self::default()
        }
    }

    /// Recompute `amount` from the current factors; cleared when either
    /// factor is missing.
    pub fn recompute_amount(&mut self) {
        self.amount = match (self.quantity, self.rate) {
            (Some(quantity), Some(rate)) => Some(rate * quantity),
            _ => None,
        };
    }
}

impl Entity for LineItem {
    type Id = u32;

    fn id(&self) -> &u32 {
        &self.item_no
    }
}
