//! BucketArray: one optional run-head per bucket.
//!
//! Slots never own nodes; they only name the first node of their run
//! inside the chain arena. A slot is `None` exactly when its run is empty.

use crate::node::NodeKey;

/// Largest slot count whose storage fits in `isize::MAX` bytes.
pub(crate) const MAX_BUCKETS: usize =
    isize::MAX as usize / core::mem::size_of::<Option<NodeKey>>();

#[derive(Debug, Clone)]
pub(crate) struct BucketArray {
    slots: Box<[Option<NodeKey>]>,
}

impl BucketArray {
    pub(crate) fn new(count: usize) -> Self {
        debug_assert!(count > 0, "bucket array must not be empty");
        Self {
            slots: vec![None; count].into_boxed_slice(),
        }
    }

    /// Like `new`, but `None` when the slots cannot be allocated.
    pub(crate) fn try_new(count: usize) -> Option<Self> {
        debug_assert!(count > 0, "bucket array must not be empty");
        let mut slots = Vec::new();
        slots.try_reserve_exact(count).ok()?;
        slots.resize(count, None);
        Some(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn index_for(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn slot(&self, bucket: usize) -> Option<NodeKey> {
        self.slots[bucket]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, bucket: usize) -> &mut Option<NodeKey> {
        &mut self.slots[bucket]
    }

    /// Empty every slot; capacity is retained.
    pub(crate) fn reset(&mut self) {
        self.slots.fill(None);
    }

    #[cfg(test)]
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, NodeKey)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(b, s)| s.map(|k| (b, k)))
    }
}
