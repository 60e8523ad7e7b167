//! Arena cell for one key/value entry of the global chain.

slotmap::new_key_type! {
    /// Generational index of a node inside the chain arena.
    pub(crate) struct NodeKey;
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Cached so rebucketing never calls `K: Hash` again.
    pub(crate) hash: u64,
    pub(crate) bucket: usize,
    pub(crate) prev: Option<NodeKey>,
    pub(crate) next: Option<NodeKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u64, bucket: usize) -> Self {
        Self {
            key,
            value,
            hash,
            bucket,
            prev: None,
            next: None,
        }
    }
}
