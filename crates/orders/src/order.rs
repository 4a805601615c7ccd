use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{CompanyCode, DocumentTypeId, Entity, Money, OrderId, VendorNumber};

use crate::reference::{Company, DocumentType, Vendor};

/// Purchase order header record as exchanged with the backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// User-assigned key; empty while the order is still a transient draft.
    pub id: OrderId,
    pub description: String,
    pub vendor_number: Option<VendorNumber>,
    pub company_code: Option<CompanyCode>,
    pub document_type_id: Option<DocumentTypeId>,

    /// Denormalized display copies of the referenced entities. Refreshed
    /// opportunistically; never authoritative.
    pub vendor: Option<Vendor>,
    pub company: Option<Company>,
    pub document_type: Option<DocumentType>,

    /// Sum of the line items' amounts. Derived by the store on read; never
    /// stored and never submitted.
    pub total_amount: Option<Money>,

    /// Maintained by the store on every accepted upsert.
    pub modified_at: Option<DateTime<Utc>>,
}

impl Order {
    /// A fresh draft: empty id and description, all foreign keys null.
    pub fn draft() -> Self {
        Self::default()
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &OrderId {
        &self.id
    }
}
