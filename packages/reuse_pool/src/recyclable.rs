use crate::PoolRegistry;

/// A value that [`PoolRegistry::release()`] knows how to route back to the pool it came from.
///
/// Implemented for the two shapes the registry hands out: `Box<T>` from an object pool and
/// `Box<[T]>` from an array pool. Arrays are routed by their element type and actual length.
pub trait Recyclable: Send + Sized + 'static {
    /// Returns `self` to the matching pool of `registry`, if one exists.
    ///
    /// Prefer calling [`PoolRegistry::release()`], which forwards here.
    fn recycle(self, registry: &PoolRegistry);
}

impl<T: Send + 'static> Recyclable for Box<T> {
    fn recycle(self, registry: &PoolRegistry) {
        registry.release_object(self);
    }
}

impl<T: Default + Send + 'static> Recyclable for Box<[T]> {
    fn recycle(self, registry: &PoolRegistry) {
        registry.release_array(self);
    }
}
