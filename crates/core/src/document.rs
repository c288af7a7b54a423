//! Document trait: the unit of storage in a shop-scoped collection.

/// What every stored record exposes to the store.
pub trait Document {
    /// Strongly-typed document identifier. Ids are small `Copy` newtypes and
    /// travel by value.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// The document's identifier.
    fn id(&self) -> Self::Id;
}
