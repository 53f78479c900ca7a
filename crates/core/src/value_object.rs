//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Resource keys, stacks and durability facets are value objects: they are
/// **immutable**, created per call and compared by their attributes. A stack is
/// never "the same" stack as another one; two stacks holding the same key and
/// count are simply equal.
///
/// To "modify" a value object, derive a new one (`ResourceStack::shrink`,
/// `ResourceKey::to_stack`, ...).
///
/// ```ignore
/// let a = ResourceKey::of(ItemId::new("minecraft:stone")).to_stack(10);
/// let b = ResourceKey::of(ItemId::new("minecraft:stone")).to_stack(10);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
