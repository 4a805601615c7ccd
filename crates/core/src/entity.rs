//! Entity trait.

/// An object with a stable identity that outlives changes to its fields.
///
/// Orders and line items are entities; `Money` is not. Equality of two
/// entities is equality of their ids, not of their current field values.
pub trait Entity {
    /// The strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
