//! ChainedTable: separate chaining over `Chain` buckets, with a fixed growth
//! policy and a cursor that can remove entries mid-traversal.

use crate::chain::{self, Chain, NodeKey};
use crate::fnv::fnv1a_64;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;

/// Grow once `len >= MAX_LOAD_FACTOR * bucket_count`.
pub const MAX_LOAD_FACTOR: usize = 3;
/// Bucket count multiplier applied on each growth.
pub const GROWTH_FACTOR: usize = 9;

/// A stored `(hash, key, value)` record.
///
/// The hash is computed by the caller and never recomputed by the table;
/// it must be consistent with the table's key predicate (equal keys, equal
/// hashes).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Entry<K, V> {
    pub hash: u64,
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(hash: u64, key: K, value: V) -> Self {
        Self { hash, key, value }
    }
}

impl<K: AsRef<[u8]>, V> Entry<K, V> {
    /// Build an entry whose hash is FNV-1a over the key's bytes.
    pub fn keyed(key: K, value: V) -> Self {
        let hash = fnv1a_64(key.as_ref());
        Self { hash, key, value }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("a chained table needs at least one bucket")]
    ZeroBuckets,
}

/// Default key predicate type: a plain function pointer.
pub type KeyEq<K> = fn(&K, &K) -> bool;

/// Hash table of `Chain` buckets keyed by caller-supplied hashes.
///
/// Every entry lives in bucket `hash % bucket_count`; `len` is the sum of
/// the bucket lengths. Same-key detection uses the predicate given at
/// construction, not `K: Eq`.
pub struct ChainedTable<K, V, E = KeyEq<K>> {
    buckets: Vec<Chain<Entry<K, V>>>,
    len: usize,
    key_eq: E,
}

#[inline]
fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

fn empty_buckets<T>(bucket_count: usize) -> Vec<Chain<T>> {
    let mut buckets = Vec::with_capacity(bucket_count);
    buckets.resize_with(bucket_count, Chain::new);
    buckets
}

impl<K: PartialEq, V> ChainedTable<K, V> {
    /// Table comparing keys with `PartialEq`.
    pub fn with_buckets(bucket_count: usize) -> Result<Self, TableError> {
        Self::new(bucket_count, <K as PartialEq>::eq)
    }
}

impl<K, V, E> ChainedTable<K, V, E> {
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Consume the table, passing every stored entry to `dispose` exactly
    /// once.
    pub fn destroy<F>(self, mut dispose: F)
    where
        F: FnMut(Entry<K, V>),
    {
        for chain in self.buckets {
            chain.destroy(&mut dispose);
        }
    }

    /// Iterator over entries: buckets in ascending order, newest first
    /// within a bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Iterator yielding `(&K, &mut V)`. Visit order is unspecified.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Cursor over every entry that can remove as it goes.
    pub fn cursor(&mut self) -> TableCursor<'_, K, V, E> {
        TableCursor::new(self)
    }

    #[cfg(test)]
    pub(crate) fn buckets_for_test(&self) -> &[Chain<Entry<K, V>>] {
        &self.buckets
    }
}

impl<K, V, E> ChainedTable<K, V, E>
where
    E: Fn(&K, &K) -> bool,
{
    pub fn new(bucket_count: usize, key_eq: E) -> Result<Self, TableError> {
        if bucket_count == 0 {
            return Err(TableError::ZeroBuckets);
        }
        log::trace!("new chained table with {bucket_count} buckets");
        Ok(Self {
            buckets: empty_buckets(bucket_count),
            len: 0,
            key_eq,
        })
    }

    fn locate(&self, hash: u64, key: &K) -> Option<(usize, NodeKey)> {
        let b = bucket_index(hash, self.buckets.len());
        let node = self.buckets[b].position(|e| (self.key_eq)(&e.key, key))?;
        Some((b, node))
    }

    /// Store `entry`, returning the entry it replaced if the key was
    /// already present. A replacement keeps its node and leaves `len`
    /// unchanged.
    ///
    /// The growth check runs first on every call, overwrites included.
    pub fn insert(&mut self, entry: Entry<K, V>) -> Option<Entry<K, V>> {
        self.maybe_grow();

        let b = bucket_index(entry.hash, self.buckets.len());
        let key_eq = &self.key_eq;
        let chain = &mut self.buckets[b];
        match chain.position(|e| key_eq(&e.key, &entry.key)) {
            Some(node) => Some(chain.replace(node, entry)),
            None => {
                chain.push(entry);
                self.len += 1;
                None
            }
        }
    }

    pub fn find(&self, hash: u64, key: &K) -> Option<&Entry<K, V>> {
        let (b, node) = self.locate(hash, key)?;
        self.buckets[b].get(node)
    }

    pub fn get_mut(&mut self, hash: u64, key: &K) -> Option<&mut V> {
        let (b, node) = self.locate(hash, key)?;
        self.buckets[b].get_mut(node).map(|e| &mut e.value)
    }

    pub fn contains(&self, hash: u64, key: &K) -> bool {
        self.locate(hash, key).is_some()
    }

    /// Detach and return the entry for `key`.
    pub fn remove(&mut self, hash: u64, key: &K) -> Option<Entry<K, V>> {
        let (b, node) = self.locate(hash, key)?;
        let entry = self.buckets[b].unlink(node)?;
        self.len -= 1;
        Some(entry)
    }

    fn maybe_grow(&mut self) {
        let bucket_count = self.buckets.len();
        if self.len < MAX_LOAD_FACTOR.saturating_mul(bucket_count) {
            return;
        }
        let Some(grown) = bucket_count.checked_mul(GROWTH_FACTOR) else {
            log::warn!("chained table cannot grow past {bucket_count} buckets");
            return;
        };
        log::debug!(
            "growing chained table from {bucket_count} to {grown} buckets ({} entries)",
            self.len
        );

        // Move entries into the replacement array, then adopt it. The old
        // chains end up empty and are torn down without touching entries.
        let mut fresh = empty_buckets(grown);
        for chain in &mut self.buckets {
            while let Some(entry) = chain.pop() {
                fresh[bucket_index(entry.hash, grown)].push(entry);
            }
        }
        let stale = mem::replace(&mut self.buckets, fresh);
        debug_assert!(stale.iter().all(Chain::is_empty));
        for chain in stale {
            chain.destroy(|_| {});
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, E> fmt::Debug for ChainedTable<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedTable")
            .field("len", &self.len)
            .field("bucket_count", &self.buckets.len())
            .field("buckets", &self.buckets)
            .finish()
    }
}

impl<'a, K, V, E> IntoIterator for &'a ChainedTable<K, V, E> {
    type Item = &'a Entry<K, V>;
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, E> IntoIterator for &'a mut ChainedTable<K, V, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over shared entries in `ChainedTable`.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Chain<Entry<K, V>>>,
    chain: Option<chain::Iter<'a, Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(|it| it.next()) {
                self.remaining -= 1;
                return Some(entry);
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over keys and mutable values in `ChainedTable`.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Chain<Entry<K, V>>>,
    chain: Option<chain::IterMut<'a, Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(|it| it.next()) {
                self.remaining -= 1;
                let Entry { key, value, .. } = entry;
                return Some((&*key, value));
            }
            self.chain = Some(self.buckets.next()?.iter_mut());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// A position in a `ChainedTable`: a bucket index plus a node in that
/// bucket.
///
/// Walks buckets in ascending order, skipping empty ones. Exhaustion is
/// final: an invalid cursor never becomes valid again.
pub struct TableCursor<'a, K, V, E> {
    table: &'a mut ChainedTable<K, V, E>,
    bucket: usize,
    at: Option<NodeKey>,
}

impl<'a, K, V, E> TableCursor<'a, K, V, E> {
    fn new(table: &'a mut ChainedTable<K, V, E>) -> Self {
        let mut cursor = Self {
            table,
            bucket: 0,
            at: None,
        };
        if !cursor.table.is_empty() {
            cursor.seek_from(0);
        }
        cursor
    }

    /// Position at the head of the first non-empty bucket at or after
    /// `start`, or go invalid.
    fn seek_from(&mut self, start: usize) -> bool {
        let found = self
            .table
            .buckets
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(i, chain)| chain.head_key().map(|k| (i, k)));
        match found {
            Some((b, k)) => {
                self.bucket = b;
                self.at = Some(k);
                true
            }
            None => {
                self.at = None;
                false
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.at.is_some()
    }

    pub fn get(&self) -> Option<&Entry<K, V>> {
        let k = self.at?;
        self.table.buckets[self.bucket].get(k)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        let k = self.at?;
        self.table.buckets[self.bucket]
            .get_mut(k)
            .map(|e| &mut e.value)
    }

    /// Step to the next entry, crossing into later buckets as needed.
    /// Returns false once no entries remain.
    pub fn advance(&mut self) -> bool {
        let Some(k) = self.at else {
            return false;
        };
        if let Some(next) = self.table.buckets[self.bucket].next_key(k) {
            self.at = Some(next);
            return true;
        }
        self.seek_from(self.bucket + 1)
    }

    /// Remove the current entry and return it, leaving the cursor on the
    /// entry that followed it.
    ///
    /// The cursor advances before the table is touched; node keys are
    /// stable, so the new position survives the unlink.
    pub fn remove(&mut self) -> Option<Entry<K, V>> {
        let bucket = self.bucket;
        let node = self.at?;
        self.advance();
        let entry = self.table.buckets[bucket].unlink(node)?;
        self.table.len -= 1;
        Some(entry)
    }
}
