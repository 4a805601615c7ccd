//! Draft editing session for purchase orders.
//!
//! A [`Session`] exclusively owns one order header and its line items for the
//! duration of an edit, keeps the derived amounts consistent through every
//! mutation, accumulates pending changes, and flushes them atomically as one
//! batch on save. The UI layer drives it through explicit method calls and
//! subscribes to a single coarse "state changed" notification instead of
//! reacting to granular field events.

pub mod draft;
pub mod notify;
pub mod session;

pub use draft::{DraftLine, DraftOrder};
pub use notify::{Notifier, Subscription};
pub use session::{
    Applied, LineItemUpdate, Mode, ReferenceLookup, SaveOutcome, Session, SessionId, StateChanged,
};
