//! Error types for `BucketMap`.

/// Reasons an insert can be refused. The map is unchanged in every case
/// and the rejected value is handed back to the caller.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum InsertError<V> {
    /// Keys must be non-empty.
    #[error("invalid key: keys must be non-empty")]
    InvalidKey(V),
}

impl<V> InsertError<V> {
    /// Recover the value that was not inserted.
    pub fn into_value(self) -> V {
        match self {
            InsertError::InvalidKey(v) => v,
        }
    }
}

/// The bucket array could not be reserved at construction.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("failed to allocate {buckets} buckets")]
pub struct AllocError {
    /// Effective bucket count that was requested from the allocator.
    pub buckets: usize,
}
