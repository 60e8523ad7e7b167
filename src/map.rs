//! ChainedHashMap: bucket array + shared chain, with upsert semantics and
//! proactive growth.
//!
//! Growth happens before the call that would push `len / bucket_count`
//! to the ceiling, so the load factor observed after any insert never
//! exceeds `max_load_factor`.

use crate::buckets::BucketArray;
use crate::chain::ChainList;
use crate::config::{self, MapConfig, DEFAULT_MAX_LOAD_FACTOR, MIN_BUCKETS};
use crate::cursor::Cursor;
use crate::error::MapError;
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::reentrancy::WalkGuard;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: BucketArray,
    chain: ChainList<K, V>,
    max_load_factor: f64,
    guard: WalkGuard,
}

// Structural accessors need no bounds; cursors and iterators go through them.
impl<K, V, S> ChainedHashMap<K, V, S> {
    pub(crate) fn chain(&self) -> &ChainList<K, V> {
        &self.chain
    }

    pub(crate) fn chain_mut(&mut self) -> &mut ChainList<K, V> {
        &mut self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Set the load ceiling used by later inserts; the table is not
    /// rehashed by this call.
    pub fn set_max_load_factor(&mut self, value: f64) -> Result<(), MapError> {
        config::check_max_load_factor(value)?;
        self.max_load_factor = value;
        Ok(())
    }

    pub fn config(&self) -> MapConfig {
        MapConfig {
            buckets: self.bucket_count(),
            max_load_factor: self.max_load_factor,
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry; bucket capacity and load ceiling are kept.
    pub fn clear(&mut self) {
        let _g = self.guard.relink();
        log::trace!("clearing {} entries across {} buckets", self.chain.len(), self.buckets.len());
        self.chain.clear();
        self.buckets.reset();
    }

    /// Cursor to the first entry of the chain, or `end()` when empty.
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.chain.head())
    }

    pub fn end(&self) -> Cursor {
        Cursor::END
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.chain.iter()
    }

    /// Mutable access to every value. Visits entries in storage order,
    /// which need not match the chain order of `iter` and cursors.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.chain.nodes_mut())
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Same order as `iter_mut`.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V> ChainedHashMap<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Start with `buckets` buckets, raised to `MIN_BUCKETS` if smaller.
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, DefaultHashBuilder::default())
    }

    pub fn with_config(config: MapConfig) -> Result<Self, MapError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_buckets_and_hasher(MIN_BUCKETS, hasher)
    }

    /// An unallocatable `buckets` hint falls back to `MIN_BUCKETS`.
    pub fn with_buckets_and_hasher(buckets: usize, hasher: S) -> Self {
        let wanted = MapConfig::with_buckets(buckets).bucket_count();
        let buckets = BucketArray::try_new(wanted).unwrap_or_else(|| {
            log::warn!("cannot allocate {} buckets, starting with {}", wanted, MIN_BUCKETS);
            BucketArray::new(MIN_BUCKETS)
        });
        Self {
            hasher,
            buckets,
            chain: ChainList::new(),
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            guard: WalkGuard::new(),
        }
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, MapError> {
        config.validate()?;
        let mut map = Self::with_buckets_and_hasher(config.buckets, hasher);
        map.max_load_factor = config.max_load_factor;
        Ok(map)
    }

    /// Move every entry out, leaving `self` as an empty table with
    /// `MIN_BUCKETS` buckets, the default load ceiling and the same hasher.
    pub fn take(&mut self) -> Self
    where
        S: Clone,
    {
        log::trace!("moving {} entries out of map", self.chain.len());
        Self {
            hasher: self.hasher.clone(),
            buckets: core::mem::replace(&mut self.buckets, BucketArray::new(MIN_BUCKETS)),
            chain: self.chain.take(),
            max_load_factor: core::mem::replace(
                &mut self.max_load_factor,
                DEFAULT_MAX_LOAD_FACTOR,
            ),
            guard: WalkGuard::new(),
        }
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn locate<Q>(&self, q: &Q) -> (u64, usize)
    where
        Q: ?Sized + Hash,
    {
        let hash = self.hasher.hash_one(q);
        (hash, self.buckets.index_for(hash))
    }

    /// Rehash ahead of a call that may add one entry. When the grown
    /// bucket array cannot be allocated the current one is kept and the
    /// entry goes in above the ceiling.
    fn make_room_for_one(&mut self) {
        let wanted = self.chain.len() + 1;
        if wanted as f64 / self.buckets.len() as f64 >= self.max_load_factor {
            let _ = self.rehash(wanted);
        }
    }

    fn rehash(&mut self, target: usize) -> Result<(), MapError> {
        let _g = self.guard.relink();
        let count = config::buckets_for(target.max(self.chain.len()), self.max_load_factor);
        let grown = match BucketArray::try_new(count) {
            Some(grown) => grown,
            None => {
                log::warn!(
                    "cannot allocate {} buckets; keeping {} for {} entries",
                    count,
                    self.buckets.len(),
                    self.chain.len()
                );
                return Err(MapError::InvalidValue("bucket array too large to allocate"));
            }
        };
        log::debug!(
            "rehashing {} entries: {} -> {} buckets",
            self.chain.len(),
            self.buckets.len(),
            count
        );
        self.buckets = grown;
        self.chain.rebucket(&mut self.buckets);
        Ok(())
    }

    /// Bucket index `key` maps to under the current bucket count.
    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.guard.check_read();
        self.locate(key).1
    }

    /// Insert or overwrite; returns a cursor to the entry. An existing key
    /// keeps its node and its original key value.
    pub fn insert(&mut self, key: K, value: V) -> Cursor {
        self.make_room_for_one();
        let _g = self.guard.relink();
        let (hash, bucket) = self.locate(&key);
        let (node, _) = self
            .chain
            .insert(key, value, hash, self.buckets.slot_mut(bucket), bucket);
        Cursor::at(node)
    }

    /// Like `insert`, but hands back the value that was replaced.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.make_room_for_one();
        let _g = self.guard.relink();
        let (hash, bucket) = self.locate(&key);
        self.chain
            .insert(key, value, hash, self.buckets.slot_mut(bucket), bucket)
            .1
    }

    pub fn at<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.guard.check_read();
        let (_, bucket) = self.locate(key);
        self.chain.at(self.buckets.slot(bucket), bucket, key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.at(key).ok()
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.find(key).node_key()?;
        self.chain.get_mut(node).map(|n| &mut n.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        !self.find(key).is_end()
    }

    /// Cursor to the entry for `key`, or `end()` when absent.
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.guard.check_read();
        let (_, bucket) = self.locate(key);
        Cursor::new(self.chain.find_in_run(self.buckets.slot(bucket), bucket, key))
    }

    /// Index-style access: the value for `key`, inserting `V::default()`
    /// first when absent. Always able to grow the table, so there is no
    /// shared-reference form.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Like `get_or_insert_default`; `default` runs only on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.make_room_for_one();
        let _g = self.guard.relink();
        let (hash, bucket) = self.locate(&key);
        let node = self.chain.get_or_insert_with(
            key,
            hash,
            self.buckets.slot_mut(bucket),
            bucket,
            default,
        );
        &mut self
            .chain
            .get_mut(node)
            .expect("node must exist right after lookup or insert")
            .value
    }

    /// Remove `key`, returning the owned pair.
    pub fn erase<Q>(&mut self, key: &Q) -> Result<(K, V), MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.relink();
        let (_, bucket) = self.locate(key);
        self.chain.erase(self.buckets.slot_mut(bucket), bucket, key)
    }

    /// Remove the entry under `cursor`; returns a cursor to the entry that
    /// followed it in the chain, possibly in another bucket, or `end()`.
    pub fn erase_at(&mut self, cursor: Cursor) -> Result<Cursor, MapError> {
        let _g = self.guard.relink();
        let node = cursor.node_key().ok_or(MapError::IteratorInvalid)?;
        let bucket = self.chain.get(node).ok_or(MapError::IteratorInvalid)?.bucket;
        let next = self
            .chain
            .erase_at(node, self.buckets.slot_mut(bucket), bucket)?;
        Ok(Cursor::new(next))
    }

    /// Full rehash sized for `count` entries at the current load ceiling:
    /// `max(count, len) * floor(2 / max_load_factor)` buckets, at least
    /// `MIN_BUCKETS`. Entries keep their nodes, so outstanding cursors stay
    /// valid; their bucket numbers may change. Fails with `InvalidValue`,
    /// leaving the table untouched, for a zero target or a bucket array too
    /// large to allocate.
    pub fn reserve(&mut self, count: usize) -> Result<(), MapError> {
        if count == 0 {
            return Err(MapError::InvalidValue("reserve target must be positive"));
        }
        self.rehash(count)
    }

    /// Build a map from the entries between `first` (inclusive) and `last`
    /// (exclusive) of `source`'s chain.
    pub fn from_range(source: &Self, first: Cursor, last: Cursor) -> Result<Self, MapError>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        let mut map = Self::with_hasher(source.hasher.clone());
        let mut cur = first;
        while cur != last {
            let (k, v) = cur.pair(source)?;
            map.insert(k.clone(), v.clone());
            cur.advance(source)?;
        }
        Ok(map)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.chain.assert_consistent(&self.buckets);
    }
}

impl<K, V> Default for ChainedHashMap<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy by re-insertion into a table of the source's shape.
impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::with_buckets_and_hasher(self.bucket_count(), self.hasher.clone());
        copy.max_load_factor = self.max_load_factor;
        for (k, v) in self.iter() {
            copy.insert(k.clone(), v.clone());
        }
        copy
    }
}

impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainedHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

/// Initializer-list construction: the table starts with one bucket per
/// listed pair.
impl<K, V, const N: usize> From<[(K, V); N]> for ChainedHashMap<K, V, DefaultHashBuilder>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        let mut map = Self::with_buckets(N);
        map.extend(pairs);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        let (nodes, head) = self.chain.into_parts();
        IntoIter::new(nodes, head)
    }
}
