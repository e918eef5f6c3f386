//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one. Construction is the only place validation happens, so a
/// value object in hand is always valid.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
