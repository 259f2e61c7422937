//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every record read back from the data store carries a store-assigned
/// identifier; drafts (not yet stored) do not implement this trait.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
