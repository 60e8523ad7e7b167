//! ChainList: one doubly-linked list holding every entry of the map.
//!
//! Entries of the same bucket form a contiguous run inside the list, and
//! the bucket's slot names the first node of that run. Run scans stop at
//! the first node whose bucket differs, since the next bucket's run
//! follows immediately in the same list.
//!
//! Nodes live in a generational arena; `prev`/`next` and bucket slots are
//! arena keys, so a removed node can never be reached again through a
//! stale key.

use crate::buckets::BucketArray;
use crate::error::MapError;
use crate::iter::Iter;
use crate::node::{Node, NodeKey};
use core::borrow::Borrow;
use slotmap::SlotMap;

#[derive(Debug)]
pub(crate) struct ChainList<K, V> {
    nodes: SlotMap<NodeKey, Node<K, V>>,
    head: Option<NodeKey>,
}

impl<K, V> Default for ChainList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ChainList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<NodeKey> {
        self.head
    }

    #[inline]
    pub(crate) fn get(&self, k: NodeKey) -> Option<&Node<K, V>> {
        self.nodes.get(k)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, k: NodeKey) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(k)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut SlotMap<NodeKey, Node<K, V>> {
        &mut self.nodes
    }

    pub(crate) fn into_parts(self) -> (SlotMap<NodeKey, Node<K, V>>, Option<NodeKey>) {
        (self.nodes, self.head)
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.head)
    }

    /// Scan the run starting at `slot` for `q`.
    pub(crate) fn find_in_run<Q>(
        &self,
        slot: Option<NodeKey>,
        bucket: usize,
        q: &Q,
    ) -> Option<NodeKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = slot;
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.bucket != bucket {
                break;
            }
            if node.key.borrow() == q {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    pub(crate) fn at<Q>(&self, slot: Option<NodeKey>, bucket: usize, q: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.find_in_run(slot, bucket, q)
            .map(|k| &self.nodes[k].value)
            .ok_or(MapError::NotFound)
    }

    /// Upsert: overwrite the value of an equal key in the run, or append a
    /// new node after the run. Returns the node and the replaced value.
    pub(crate) fn insert(
        &mut self,
        key: K,
        value: V,
        hash: u64,
        slot: &mut Option<NodeKey>,
        bucket: usize,
    ) -> (NodeKey, Option<V>)
    where
        K: Eq,
    {
        if let Some(k) = self.find_in_run(*slot, bucket, &key) {
            let old = core::mem::replace(&mut self.nodes[k].value, value);
            return (k, Some(old));
        }
        (self.link(Node::new(key, value, hash, bucket), slot, bucket), None)
    }

    /// Find `key` in its run or append it with `default()`; the caller has
    /// already made room for one more entry.
    pub(crate) fn get_or_insert_with<F>(
        &mut self,
        key: K,
        hash: u64,
        slot: &mut Option<NodeKey>,
        bucket: usize,
        default: F,
    ) -> NodeKey
    where
        K: Eq,
        F: FnOnce() -> V,
    {
        match self.find_in_run(*slot, bucket, &key) {
            Some(k) => k,
            None => self.link(Node::new(key, default(), hash, bucket), slot, bucket),
        }
    }

    pub(crate) fn erase<Q>(
        &mut self,
        slot: &mut Option<NodeKey>,
        bucket: usize,
        q: &Q,
    ) -> Result<(K, V), MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let k = self.find_in_run(*slot, bucket, q).ok_or(MapError::NotFound)?;
        let node = self.unlink(k, slot, bucket).ok_or(MapError::NotFound)?;
        Ok((node.key, node.value))
    }

    /// Remove a known node; returns its successor in the chain, which may
    /// head another bucket's run.
    pub(crate) fn erase_at(
        &mut self,
        k: NodeKey,
        slot: &mut Option<NodeKey>,
        bucket: usize,
    ) -> Result<Option<NodeKey>, MapError> {
        self.unlink(k, slot, bucket)
            .map(|node| node.next)
            .ok_or(MapError::IteratorInvalid)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
    }

    pub(crate) fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// Relink every node into `buckets`, which must be freshly emptied.
    /// Nodes keep their arena keys; only links and bucket indices change.
    pub(crate) fn rebucket(&mut self, buckets: &mut BucketArray) {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut cur = self.head.take();
        while let Some(k) = cur {
            order.push(k);
            cur = self.nodes[k].next;
        }
        for k in order {
            let bucket = buckets.index_for(self.nodes[k].hash);
            self.splice(k, buckets.slot_mut(bucket), bucket);
        }
    }

    fn link(&mut self, node: Node<K, V>, slot: &mut Option<NodeKey>, bucket: usize) -> NodeKey {
        let k = self.nodes.insert(node);
        self.splice(k, slot, bucket);
        k
    }

    // An empty run starts at the global head; otherwise the node goes right
    // after the run's last node.
    fn splice(&mut self, k: NodeKey, slot: &mut Option<NodeKey>, bucket: usize) {
        let (prev, next) = match *slot {
            None => {
                let old_head = self.head;
                self.head = Some(k);
                *slot = Some(k);
                (None, old_head)
            }
            Some(run_head) => {
                let tail = self.run_tail(run_head, bucket);
                let after = self.nodes[tail].next;
                self.nodes[tail].next = Some(k);
                (Some(tail), after)
            }
        };
        if let Some(n) = next {
            self.nodes[n].prev = Some(k);
        }
        let node = &mut self.nodes[k];
        node.bucket = bucket;
        node.prev = prev;
        node.next = next;
    }

    fn run_tail(&self, run_head: NodeKey, bucket: usize) -> NodeKey {
        let mut tail = run_head;
        while let Some(next) = self.nodes[tail].next {
            if self.nodes[next].bucket != bucket {
                break;
            }
            tail = next;
        }
        tail
    }

    fn unlink(
        &mut self,
        k: NodeKey,
        slot: &mut Option<NodeKey>,
        bucket: usize,
    ) -> Option<Node<K, V>> {
        let node = self.nodes.remove(k)?;
        if *slot == Some(k) {
            *slot = node.next.filter(|&n| self.nodes[n].bucket == bucket);
        }
        if self.head == Some(k) {
            self.head = node.next;
        }
        if let Some(p) = node.prev {
            self.nodes[p].next = node.next;
        }
        if let Some(n) = node.next {
            self.nodes[n].prev = node.prev;
        }
        Some(node)
    }

    /// Panics unless links are mutually consistent, every run is contiguous
    /// and headed by its slot, and every occupied slot heads a run.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self, buckets: &BucketArray) {
        use std::collections::HashSet;

        let mut started: HashSet<usize> = HashSet::new();
        let mut current: Option<usize> = None;
        let mut prev: Option<NodeKey> = None;
        let mut seen = 0usize;
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = &self.nodes[k];
            assert_eq!(node.prev, prev, "prev link does not mirror next link");
            assert!(node.bucket < buckets.len(), "bucket index out of range");
            assert_eq!(buckets.index_for(node.hash), node.bucket, "node in wrong bucket");
            if current != Some(node.bucket) {
                assert!(started.insert(node.bucket), "run of bucket {} is split", node.bucket);
                assert_eq!(buckets.slot(node.bucket), Some(k), "slot must name its run head");
                current = Some(node.bucket);
            }
            seen += 1;
            prev = Some(k);
            cur = node.next;
        }
        assert_eq!(seen, self.nodes.len(), "unreachable nodes in arena");
        for (b, _) in buckets.occupied() {
            assert!(started.contains(&b), "slot {} names no run", b);
        }
    }
}
