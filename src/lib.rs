//! bucket-hashmap: a single-threaded, string-keyed map with a fixed
//! number of separately chained buckets and optional value ownership.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small map whose bucket placement, chain layout, and
//!   iteration order are fully deterministic and easy to reason about.
//! - Layers:
//!   - `hash`: unseeded base-31 polynomial hash reduced modulo the bucket
//!     count.
//!   - `chain`: every chain node lives in one generational arena
//!     (`slotmap`); a bucket is an optional head key and a chain ends at
//!     the first node whose `next` is `None`.
//!   - `BucketMap<'k, V, D>`: public API for insert/update, lookup,
//!     occupancy, position-based iteration, and teardown.
//!
//! Constraints
//! - Single-threaded; no internal locking. Lookups and iteration take
//!   `&self`, inserts take `&mut self`.
//! - Keys are borrowed (`&'k str`) and never copied; the key storage must
//!   outlive the map.
//! - The bucket count is fixed at construction (floor `MIN_BUCKETS`);
//!   there is no rehashing, so operations cost O(chain length).
//! - No removal of individual entries.
//!
//! Value ownership
//! - Without a deleter, superseded values are returned from `insert`
//!   and remaining values are dropped with the map.
//! - With a deleter, the map owns its values: every superseded value is
//!   passed to the deleter on overwrite, whether the entry is a chain head
//!   or not, and every live value is passed to it once when the map is
//!   dropped.
//!
//! Chain layout
//! - A new key in an empty bucket becomes the head. A new key in an
//!   occupied bucket is spliced directly after the head, so a chain reads
//!   oldest, newest, ..., second-oldest.
//!
//! Iteration
//! - `front`/`next`/`back` work on `Position { bucket, index }` and
//!   re-derive the following entry from the position on every call; no
//!   cursor state is kept between calls. Positions are only meaningful
//!   while the map is unchanged.
//! - `iter()` yields the same sequence without re-walking chains.
//!
//! Logging
//! - Structured `tracing` events at debug/trace level on construction,
//!   insert, and teardown. No subscriber is installed by this crate.

mod bucket_map;
#[cfg(test)]
mod bucket_map_proptest;
mod chain;
mod error;
pub mod hash;

// Public surface
pub use bucket_map::{BucketMap, Iter, Position, MIN_BUCKETS};
pub use error::{AllocError, InsertError};
