//! Purchase-order data model.
//!
//! This crate contains the records exchanged with the backing store: the order
//! header, its line items, and the reference entities the header points at.
//! It is pure data (no IO, no HTTP, no storage); edit-time lifecycle
//! bookkeeping lives in the session crate.

pub mod line_item;
pub mod order;
pub mod reference;

pub use line_item::LineItem;
pub use order::Order;
pub use reference::{Company, DocumentType, ReferenceEntity, ReferenceKind, Vendor};
