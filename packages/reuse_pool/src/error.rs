use thiserror::Error;

/// Errors returned by the pooled collections.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A reallocation asked for a size smaller than the number of elements already present.
    #[error("cannot reallocate to size {requested} while holding {size} elements")]
    ShrinkBelowSize {
        /// The size that was asked for.
        requested: usize,

        /// The number of elements currently held.
        size: usize,
    },

    /// An index referred to a position past the end of the live elements.
    #[error("index {index} is out of bounds for a collection of {size} elements")]
    IndexOutOfBounds {
        /// The index that was asked for.
        index: usize,

        /// The number of elements currently held.
        size: usize,
    },
}

/// A specialized `Result` type for pooled collection operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
