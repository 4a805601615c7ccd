//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// instances with the same values are interchangeable. `Money` is the
/// canonical example: an `Order` is an entity, its total is a value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
