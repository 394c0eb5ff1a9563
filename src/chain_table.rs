//! ChainTable: fixed bucket array of singly-linked chains backed by an arena.
//!
//! Each bucket owns the head of its chain and each node owns its successor;
//! links are generational `NodeKey`s into a `SlotMap`, so a removed node can
//! never be reached through a stale link. This layer performs no locking.

use crate::error::{BuildError, InsertError};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeKey;
}

/// Upper bound on live nodes; `SlotMap` cannot index more than this.
pub(crate) const MAX_NODES: usize = u32::MAX as usize - 1;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    next: Option<NodeKey>,
}

#[derive(Debug)]
pub(crate) struct ChainTable<K, V> {
    heads: Vec<Option<NodeKey>>,
    nodes: SlotMap<NodeKey, Node<K, V>>,
    max_nodes: usize,
}

impl<K, V> ChainTable<K, V> {
    pub(crate) fn with_buckets(buckets: usize) -> Self {
        debug_assert!(buckets > 0);
        Self {
            heads: vec![None; buckets],
            nodes: SlotMap::with_key(),
            max_nodes: MAX_NODES,
        }
    }

    pub(crate) fn try_with_buckets(buckets: usize) -> Result<Self, BuildError> {
        debug_assert!(buckets > 0);
        let mut heads = Vec::new();
        heads
            .try_reserve_exact(buckets)
            .map_err(|_| BuildError::Allocation { buckets })?;
        heads.resize(buckets, None);
        Ok(Self {
            heads,
            nodes: SlotMap::with_key(),
            max_nodes: MAX_NODES,
        })
    }

    /// Lower the node limit so exhaustion can be reached in tests.
    #[cfg(test)]
    pub(crate) fn with_node_limit(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.min(MAX_NODES);
        self
    }

    pub(crate) fn buckets(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Entries of one bucket, head first.
    pub(crate) fn chain(&self, bucket: usize) -> Chain<'_, K, V> {
        Chain {
            nodes: &self.nodes,
            cursor: self.heads[bucket],
        }
    }

    /// Every entry as `(bucket, key, value)`, by bucket then chain position.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &K, &V)> + '_ {
        (0..self.heads.len()).flat_map(move |b| self.chain(b).map(move |(k, v)| (b, k, v)))
    }

    /// Release every node. Returns how many were released.
    ///
    /// The table is emptied before any entry is dropped, so a panicking
    /// destructor leaves it empty and consistent; the remaining entries are
    /// still dropped while the panic unwinds.
    pub(crate) fn clear(&mut self) -> usize {
        self.heads.fill(None);
        let nodes = core::mem::replace(&mut self.nodes, SlotMap::with_key());
        let released = nodes.len();
        drop(nodes);
        released
    }

    /// Number of nodes reachable from the bucket heads.
    #[cfg(test)]
    pub(crate) fn reachable(&self) -> usize {
        (0..self.heads.len()).map(|b| self.chain(b).count()).sum()
    }
}

impl<K: Eq, V> ChainTable<K, V> {
    pub(crate) fn get(&self, bucket: usize, key: &K) -> Option<&V> {
        self.chain(bucket).find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Overwrite the value of `key` in place, or append a new node at the
    /// tail of the bucket's chain. Returns the previous value on update.
    pub(crate) fn upsert(&mut self, bucket: usize, key: K, value: V) -> Result<Option<V>, InsertError> {
        let mut tail: Option<NodeKey> = None;
        let mut cursor = self.heads[bucket];
        while let Some(k) = cursor {
            let node = &mut self.nodes[k];
            if node.key == key {
                return Ok(Some(core::mem::replace(&mut node.value, value)));
            }
            tail = Some(k);
            cursor = node.next;
        }

        if self.nodes.len() >= self.max_nodes {
            return Err(InsertError::SlotsExhausted);
        }
        let new = self.nodes.insert(Node {
            key,
            value,
            next: None,
        });
        match tail {
            None => self.heads[bucket] = Some(new),
            Some(t) => self.nodes[t].next = Some(new),
        }
        Ok(None)
    }

    /// Unlink and release the node holding `key`.
    pub(crate) fn remove(&mut self, bucket: usize, key: &K) -> Option<(K, V)> {
        let mut prev: Option<NodeKey> = None;
        let mut cursor = self.heads[bucket];
        while let Some(k) = cursor {
            let node = &self.nodes[k];
            if node.key == *key {
                let node = self.nodes.remove(k)?;
                match prev {
                    None => self.heads[bucket] = node.next,
                    Some(p) => self.nodes[p].next = node.next,
                }
                return Some((node.key, node.value));
            }
            prev = Some(k);
            cursor = node.next;
        }
        None
    }
}

/// Iterator over one chain.
pub(crate) struct Chain<'a, K, V> {
    nodes: &'a SlotMap<NodeKey, Node<K, V>>,
    cursor: Option<NodeKey>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}
