use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

/// A collection that can be emptied in place, keeping its allocated capacity.
///
/// Collections handed out by [`PoolRegistry::acquire_collection()`][1] are always empty, and
/// [`PoolRegistry::release_collection()`][2] empties them again before they go back into the
/// pool, so no elements outlive their use.
///
/// [1]: crate::PoolRegistry::acquire_collection
/// [2]: crate::PoolRegistry::release_collection
pub trait Collection: Default + Send + 'static {
    /// Removes all elements.
    fn clear(&mut self);
}

impl<T: Send + 'static> Collection for Vec<T> {
    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl<T: Send + 'static> Collection for VecDeque<T> {
    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl Collection for String {
    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl<K, V, S> Collection for HashMap<K, V, S>
where
    K: Send + 'static,
    V: Send + 'static,
    S: BuildHasher + Default + Send + 'static,
{
    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl<T, S> Collection for HashSet<T, S>
where
    T: Send + 'static,
    S: BuildHasher + Default + Send + 'static,
{
    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl<K: Send + 'static, V: Send + 'static> Collection for BTreeMap<K, V> {
    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl<T: Send + 'static> Collection for BTreeSet<T> {
    fn clear(&mut self) {
        Self::clear(self);
    }
}
