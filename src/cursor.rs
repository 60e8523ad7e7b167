//! Cursor: a copyable position in the map's global chain.
//!
//! A cursor names one node (or the end sentinel) and borrows nothing; each
//! access goes through the map it came from. Advancing follows the chain's
//! `next` link, so stepping off the last node of one bucket's run lands on
//! the first node of the next non-empty run.
//!
//! Node keys are generational: once the node is erased, or the map is
//! cleared, every cursor naming it reports `IteratorInvalid` instead of
//! aliasing a newer entry. Rehashing relinks nodes in place, so cursors
//! stay valid across growth and `reserve`.

use crate::error::MapError;
use crate::map::ChainedHashMap;
use crate::node::{Node, NodeKey};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    node: Option<NodeKey>,
}

impl Cursor {
    /// The past-the-end sentinel.
    pub const END: Cursor = Cursor { node: None };

    pub(crate) fn new(node: Option<NodeKey>) -> Self {
        Cursor { node }
    }

    pub(crate) fn at(node: NodeKey) -> Self {
        Cursor { node: Some(node) }
    }

    pub(crate) fn node_key(&self) -> Option<NodeKey> {
        self.node
    }

    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    fn node<'a, K, V, S>(
        &self,
        map: &'a ChainedHashMap<K, V, S>,
    ) -> Result<&'a Node<K, V>, MapError> {
        self.node
            .and_then(|k| map.chain().get(k))
            .ok_or(MapError::IteratorInvalid)
    }

    pub fn key<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Result<&'a K, MapError> {
        self.node(map).map(|n| &n.key)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Result<&'a V, MapError> {
        self.node(map).map(|n| &n.value)
    }

    pub fn pair<'a, K, V, S>(
        &self,
        map: &'a ChainedHashMap<K, V, S>,
    ) -> Result<(&'a K, &'a V), MapError> {
        self.node(map).map(|n| (&n.key, &n.value))
    }

    /// Mutable access to the value; the key stays immutable.
    pub fn value_mut<'a, K, V, S>(
        &self,
        map: &'a mut ChainedHashMap<K, V, S>,
    ) -> Result<&'a mut V, MapError> {
        self.node
            .and_then(|k| map.chain_mut().get_mut(k))
            .map(|n| &mut n.value)
            .ok_or(MapError::IteratorInvalid)
    }

    /// The cursor one step further along the chain.
    pub fn successor<K, V, S>(&self, map: &ChainedHashMap<K, V, S>) -> Result<Cursor, MapError> {
        self.node(map).map(|n| Cursor::new(n.next))
    }

    /// Step this cursor forward in place.
    pub fn advance<K, V, S>(&mut self, map: &ChainedHashMap<K, V, S>) -> Result<(), MapError> {
        *self = self.successor(map)?;
        Ok(())
    }

    /// Index of the bucket whose run currently holds this node.
    pub fn bucket_number<K, V, S>(&self, map: &ChainedHashMap<K, V, S>) -> Result<usize, MapError> {
        self.node(map).map(|n| n.bucket)
    }
}
