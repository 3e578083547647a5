//! BucketMap: fixed bucket array of separately chained entries, with an
//! optional deleter that takes ownership of values.

use crate::chain::{self, Arena, Chain, Node, NodeKey};
use crate::error::{AllocError, InsertError};
use crate::hash::bucket_index;
use core::fmt;
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

/// Smallest bucket count a map is built with; smaller requests are raised
/// to this floor.
pub const MIN_BUCKETS: usize = 8;

/// Iteration position: a bucket and the entry's offset within its chain.
///
/// Positions are plain indices. They stay meaningful only while the map is
/// not mutated; after an insert they may name a different entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    bucket: usize,
    index: usize,
}

impl Position {
    /// Bucket the entry lives in.
    #[inline]
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Offset of the entry within its chain, head is 0.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Key of the entry at this position in `map`, if it names one.
    pub fn key<'k, V, D>(&self, map: &BucketMap<'k, V, D>) -> Option<&'k str>
    where
        D: FnMut(V),
    {
        map.node_at(*self).map(|n| n.key)
    }

    /// Value of the entry at this position in `map`, if it names one.
    pub fn value<'a, V, D>(&self, map: &'a BucketMap<'_, V, D>) -> Option<&'a V>
    where
        D: FnMut(V),
    {
        map.node_at(*self).map(|n| &n.value)
    }
}

/// String-keyed map with a fixed number of buckets.
///
/// Keys are borrowed for `'k` and never copied. When built with a deleter
/// the map owns its values: superseded values and, on drop, every live
/// value are passed to the deleter exactly once. Without one, superseded
/// values are handed back from [`BucketMap::insert`].
///
/// The bucket count never changes. Lookups and inserts cost O(chain
/// length), so throughput degrades once the key count grows well past
/// the bucket count.
pub struct BucketMap<'k, V, D = fn(V)>
where
    D: FnMut(V),
{
    heads: Vec<Option<NodeKey>>,
    nodes: Arena<'k, V>,
    len: usize,
    deleter: Option<D>,
}

impl<'k, V> BucketMap<'k, V> {
    /// Map that never disposes of values itself.
    pub fn new(buckets: usize) -> Self {
        Self::build(buckets, None)
    }

    /// Like [`BucketMap::new`], but reports a failed bucket reservation
    /// instead of aborting.
    pub fn try_new(buckets: usize) -> Result<Self, AllocError> {
        Self::try_build(buckets, None)
    }
}

impl<'k, V, D> BucketMap<'k, V, D>
where
    D: FnMut(V),
{
    /// Map that owns its values and releases them through `deleter`.
    pub fn with_deleter(buckets: usize, deleter: D) -> Self {
        Self::build(buckets, Some(deleter))
    }

    /// Like [`BucketMap::with_deleter`], but reports a failed bucket
    /// reservation instead of aborting.
    pub fn try_with_deleter(buckets: usize, deleter: D) -> Result<Self, AllocError> {
        Self::try_build(buckets, Some(deleter))
    }

    fn build(buckets: usize, deleter: Option<D>) -> Self {
        let size = buckets.max(MIN_BUCKETS);
        debug!(
            requested = buckets,
            buckets = size,
            owns_values = deleter.is_some(),
            "bucket map created"
        );
        Self {
            heads: vec![None; size],
            nodes: SlotMap::with_key(),
            len: 0,
            deleter,
        }
    }

    fn try_build(buckets: usize, deleter: Option<D>) -> Result<Self, AllocError> {
        let size = buckets.max(MIN_BUCKETS);
        let mut heads = Vec::new();
        if heads.try_reserve_exact(size).is_err() {
            warn!(buckets = size, "bucket reservation failed");
            return Err(AllocError { buckets: size });
        }
        heads.resize(size, None);
        debug!(
            requested = buckets,
            buckets = size,
            owns_values = deleter.is_some(),
            "bucket map created"
        );
        Ok(Self {
            heads,
            nodes: SlotMap::with_key(),
            len: 0,
            deleter,
        })
    }

    /// Number of distinct keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed bucket count, at least [`MIN_BUCKETS`].
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// Number of buckets holding at least one entry.
    pub fn occupied_buckets(&self) -> usize {
        self.heads.iter().filter(|h| h.is_some()).count()
    }

    /// Number of live entries in bucket `n`; 0 when `n` is out of range.
    pub fn bucket_len(&self, n: usize) -> usize {
        self.heads
            .get(n)
            .map_or(0, |&head| Chain::new(&self.nodes, head).count())
    }

    /// Bucket that `key` is (or would be) stored in.
    #[inline]
    pub fn bucket_of(&self, key: &str) -> usize {
        bucket_index(key, self.heads.len())
    }

    /// Whether the map owns its values.
    #[inline]
    pub fn has_deleter(&self) -> bool {
        self.deleter.is_some()
    }

    /// Insert `value` under `key`, or overwrite the value already stored
    /// under an equal key.
    ///
    /// Returns the superseded value when the map has no deleter; with a
    /// deleter the superseded value is released and `Ok(None)` returned.
    /// An empty key is refused, the map left untouched, and `value` returned
    /// inside the error without reaching the deleter.
    pub fn insert(&mut self, key: &'k str, value: V) -> Result<Option<V>, InsertError<V>> {
        if key.is_empty() {
            debug!("insert rejected: empty key");
            return Err(InsertError::InvalidKey(value));
        }
        let bucket = self.bucket_of(key);
        let head = self.heads[bucket];

        if let Some(node) = chain::find(&self.nodes, head, key).and_then(|k| self.nodes.get_mut(k))
        {
            let old = core::mem::replace(&mut node.value, value);
            trace!(key, bucket, "updated");
            return Ok(self.release(old));
        }

        chain::splice(&mut self.nodes, &mut self.heads[bucket], key, value);
        self.len += 1;
        trace!(key, bucket, len = self.len, "inserted");
        Ok(None)
    }

    fn release(&mut self, value: V) -> Option<V> {
        match self.deleter.as_mut() {
            Some(deleter) => {
                deleter(value);
                None
            }
            None => Some(value),
        }
    }

    fn find_node(&self, key: &str) -> Option<NodeKey> {
        if key.is_empty() {
            return None;
        }
        chain::find(&self.nodes, self.heads[self.bucket_of(key)], key)
    }

    /// Value stored under `key`, if any.
    pub fn at(&self, key: &str) -> Option<&V> {
        self.find_node(key)
            .and_then(|k| self.nodes.get(k))
            .map(|n| &n.value)
    }

    /// Mutable access to the value stored under `key`.
    pub fn at_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.find_node(key)?;
        self.nodes.get_mut(k).map(|n| &mut n.value)
    }

    /// Whether an entry with an equal key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.find_node(key).is_some()
    }

    fn node_at(&self, pos: Position) -> Option<&Node<'k, V>> {
        let head = *self.heads.get(pos.bucket)?;
        Chain::new(&self.nodes, head).nth(pos.index).map(|(_, n)| n)
    }

    fn first_from(&self, bucket: usize) -> Option<Position> {
        let rest = self.heads.get(bucket..)?;
        rest.iter().position(Option::is_some).map(|off| Position {
            bucket: bucket + off,
            index: 0,
        })
    }

    /// First entry: the head of the lowest-indexed non-empty bucket.
    pub fn front(&self) -> Option<Position> {
        self.first_from(0)
    }

    /// Entry following `pos`: the next node in the same chain, else the
    /// head of the next non-empty bucket.
    ///
    /// Returns `None` past the last entry, or when `pos` does not name a
    /// live entry.
    pub fn next(&self, pos: Position) -> Option<Position> {
        let node = self.node_at(pos)?;
        if node.next.is_some() {
            return Some(Position {
                bucket: pos.bucket,
                index: pos.index + 1,
            });
        }
        self.first_from(pos.bucket + 1)
    }

    /// Last entry: the tail of the highest-indexed non-empty bucket.
    pub fn back(&self) -> Option<Position> {
        let bucket = self.heads.iter().rposition(Option::is_some)?;
        let len = self.bucket_len(bucket);
        Some(Position {
            bucket,
            index: len.saturating_sub(1),
        })
    }

    /// Entries in bucket order, head-to-tail within a bucket; the same
    /// sequence as `front` followed by repeated `next`, walked in one pass
    /// instead of re-deriving each step.
    pub fn iter(&self) -> Iter<'_, 'k, V> {
        Iter {
            nodes: &self.nodes,
            heads: self.heads.iter().enumerate(),
            bucket: 0,
            index: 0,
            cur: None,
            remaining: self.len,
        }
    }
}

impl<'k, V, D> Drop for BucketMap<'k, V, D>
where
    D: FnMut(V),
{
    fn drop(&mut self) {
        let Some(deleter) = self.deleter.as_mut() else {
            return;
        };
        let mut released = 0usize;
        for (_, node) in self.nodes.drain() {
            deleter(node.value);
            released += 1;
        }
        trace!(released, "bucket map released values");
    }
}

impl<'k, V, D> fmt::Debug for BucketMap<'k, V, D>
where
    V: fmt::Debug,
    D: FnMut(V),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(_, k, v)| (k, v)))
            .finish()
    }
}

/// Iterator over `(Position, key, value)` in bucket order.
pub struct Iter<'a, 'k, V> {
    nodes: &'a Arena<'k, V>,
    heads: core::iter::Enumerate<core::slice::Iter<'a, Option<NodeKey>>>,
    bucket: usize,
    index: usize,
    cur: Option<NodeKey>,
    remaining: usize,
}

impl<'a, 'k, V> Iterator for Iter<'a, 'k, V> {
    type Item = (Position, &'k str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur.take() {
                let node = self.nodes.get(k)?;
                let pos = Position {
                    bucket: self.bucket,
                    index: self.index,
                };
                self.cur = node.next;
                self.index += 1;
                self.remaining = self.remaining.saturating_sub(1);
                return Some((pos, node.key, &node.value));
            }
            let (bucket, head) = self.heads.next()?;
            self.bucket = bucket;
            self.index = 0;
            self.cur = *head;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, 'k, V> ExactSizeIterator for Iter<'a, 'k, V> {}

impl<'a, 'k, V, D> IntoIterator for &'a BucketMap<'k, V, D>
where
    D: FnMut(V),
{
    type Item = (Position, &'k str, &'a V);
    type IntoIter = Iter<'a, 'k, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
