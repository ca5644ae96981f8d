//! chained-table: a separate-chaining hash table whose buckets are
//! doubly-linked chains, with cursors that can remove while traversing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep each layer small enough that its invariants can be checked
//!   on their own.
//! - Layers:
//!   - Chain<T>: doubly-linked list whose nodes live in a per-chain
//!     generational arena (`slotmap`). Links are arena keys, so removal
//!     never leaves a dangling reference. `ChainCursor` walks it and removes
//!     the node it points at.
//!   - ChainedTable<K, V, E>: a `Vec` of chains indexed by
//!     `hash % bucket_count`. Same-key detection uses the predicate `E`
//!     supplied at construction.
//!   - TableCursor: bucket index plus chain position, presenting one
//!     traversal over the whole table and removing entries mid-walk.
//!
//! Constraints
//! - Single-threaded; no interior mutability, no locking.
//! - Hashes are precomputed by the caller and stored in each `Entry`; the
//!   table never hashes keys itself. `fnv` offers FNV-1a for callers that
//!   want a ready-made hash.
//! - `bucket_count` is never zero; construction with zero buckets fails.
//!
//! Growth
//! - Before every insert, overwrites included, the table grows if
//!   `len >= MAX_LOAD_FACTOR * bucket_count`. The new bucket count is
//!   `GROWTH_FACTOR * bucket_count`.
//! - Growth moves every entry into a freshly built bucket array and then
//!   adopts it. The old array is empty by then and is dropped without
//!   touching any entry.
//!
//! Aliasing
//! - Cursors borrow their chain or table mutably, so mutating through
//!   another handle while a cursor is live does not compile. Growth is
//!   internal and never observed by a cursor.
//!
//! Notes and non-goals
//! - No persistence, no thread-safety, no open addressing.
//! - Traversal order (buckets ascending, newest first within a bucket) is an
//!   implementation detail; callers should rely only on every entry being
//!   visited once.

pub mod chain;
pub mod fnv;
pub mod table;
mod table_proptest;

// Public surface
pub use chain::{Chain, ChainCursor};
pub use table::{
    ChainedTable, Entry, TableCursor, TableError, GROWTH_FACTOR, MAX_LOAD_FACTOR,
};
