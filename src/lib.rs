//! chained-hashmap: a separately chained hash map whose collision chains
//! are runs inside one doubly-linked list, with copyable cursors that
//! survive rehashing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the classic "bucket array + one global list" layout, but
//!   express every link as a generational arena key so no link can
//!   dangle and no node is freed twice.
//! - Layers:
//!   - `Node<K, V>`: key, value, cached hash, bucket index and
//!     `prev`/`next` keys, stored in a `slotmap::SlotMap`.
//!   - `ChainList<K, V>`: owns the arena and the global head. Entries of
//!     one bucket sit in a contiguous run; scans stop at the first node
//!     of a different bucket.
//!   - `BucketArray`: one `Option<NodeKey>` per bucket naming the head of
//!     that bucket's run.
//!   - `ChainedHashMap<K, V, S>`: hashes keys to buckets, grows ahead of
//!     inserts, and hands the matching slot to `ChainList` so it can
//!     repair run heads on insert and erase.
//!   - `Cursor`: a copyable node position; stepping follows the chain and
//!     so crosses bucket boundaries on its own.
//!
//! Invariants
//! - Every bucket's run is contiguous and its slot names the run head; an
//!   empty run has an empty slot.
//! - `len / bucket_count <= max_load_factor` right after any insert;
//!   growth is decided before the bucket of the new key is computed.
//! - Insert is an upsert: an equal key keeps its node and gets the new
//!   value.
//! - Failed operations change nothing; validation precedes mutation.
//!
//! Rehashing
//! - Every node caches its `u64` hash; rehashing relinks the existing
//!   nodes into the new bucket array without calling `K: Hash` and
//!   without reallocating nodes, so cursors stay valid. Only their
//!   bucket numbers change.
//! - Growth target is `n * floor(2 / max_load_factor)` buckets (at least
//!   one bucket per entry, at least `MIN_BUCKETS`).
//!
//! Cursor validity
//! - Erase, `clear` and dropping the map invalidate cursors to the
//!   affected nodes. Generational keys make such cursors report
//!   `MapError::IteratorInvalid` instead of reaching another entry.
//! - `erase_at` returns the successor cursor; it is the one mutation
//!   meant to be interleaved with a cursor walk.
//!
//! Concurrency
//! - Single-threaded: the map is `!Send`/`!Sync`. A debug-only guard
//!   panics if `K: Hash`/`K: Eq` reaches back into the map while an
//!   insert, erase, rehash or clear is relinking the chain. Nested
//!   read-only lookups are allowed.
//!
//! Growth limits
//! - Bucket counts are capped at what the slot array can address. When a
//!   grown array cannot be allocated, inserts keep the current buckets
//!   (the load ceiling is then exceeded) and `reserve` reports
//!   `InvalidValue`; neither panics.
//!
//! Logging
//! - Rehashes are reported through the `log` facade at debug level,
//!   clear and take at trace level. No logger is installed here.

mod buckets;
mod chain;
mod chained_map_proptest;
pub mod config;
pub mod cursor;
pub mod error;
pub mod iter;
pub mod map;
mod node;
mod reentrancy;

// Public surface
pub use config::{MapConfig, DEFAULT_MAX_LOAD_FACTOR, MIN_BUCKETS};
pub use cursor::Cursor;
pub use error::MapError;
pub use map::ChainedHashMap;
