//! Fixed-depth sparse merkle map over 256-bit keys.
//!
//! Every key that was never set holds the value 0, so the tree never needs to
//! store empty subtrees: their roots are precomputed per height. A [`Witness`]
//! holds the sibling digests on the path from a key's leaf to the root and can
//! recompute the root for any value at that key, which is what lets one witness
//! both check the current value and produce the root after an update.

use std::collections::BTreeMap;

use crate::ds::merkle::{self, PathNode};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// number of levels between a leaf and the root
pub const DEPTH: usize = 256;

pub type Key = [u8; 32];
pub type Value = u64;

lazy_static! {
    // roots of all-zero subtrees, indexed by height
    static ref EMPTY_ROOTS: [[u8; 32]; DEPTH + 1] = {
        let mut roots = [leaf_hash(0); DEPTH + 1];
        for h in 1..=DEPTH {
            roots[h] = merkle::node(roots[h - 1], roots[h - 1]);
        }

        roots
    };
}

pub fn leaf_hash(value: Value) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&value.to_le_bytes());
    merkle::leaf(&bytes)
}

/// Root of the map where every key holds 0.
pub fn empty_root() -> [u8; 32] {
    empty_tree_root(DEPTH)
}

fn empty_tree_root(height: usize) -> [u8; 32] {
    assert!(height <= DEPTH);
    EMPTY_ROOTS[height]
}

fn bit(idx: usize, key: &Key) -> bool {
    let byte = idx / 8;
    let bit_in_byte = idx % 8;

    (key[byte] & (1 << bit_in_byte)) != 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMerkleMap {
    entries: BTreeMap<Key, Value>,
}

impl SparseMerkleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Key) -> Value {
        self.entries.get(key).copied().unwrap_or(0)
    }

    /// Setting a key to 0 is the same as never having set it.
    pub fn set(&mut self, key: Key, value: Value) {
        if value == 0 {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    /// Number of keys holding a non-zero value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn root(&self) -> [u8; 32] {
        let entries = Vec::from_iter(self.entries.iter().map(|(k, v)| (*k, *v)));
        sparse_root_rec(0, &entries)
    }

    pub fn witness(&self, key: &Key) -> Witness {
        fn sparse_path_rec(
            prefix: usize,
            key: &Key,
            entries: &[(Key, Value)],
            siblings: &mut Vec<[u8; 32]>,
        ) {
            if prefix == DEPTH {
                return;
            }
            // partition the entries
            let (left, right): (Vec<_>, Vec<_>) =
                entries.iter().copied().partition(|(k, _)| !bit(prefix, k));

            if bit(prefix, key) {
                sparse_path_rec(prefix + 1, key, &right, siblings);
                siblings.push(sparse_root_rec(prefix + 1, &left));
            } else {
                sparse_path_rec(prefix + 1, key, &left, siblings);
                siblings.push(sparse_root_rec(prefix + 1, &right));
            }
        }

        let entries = Vec::from_iter(self.entries.iter().map(|(k, v)| (*k, *v)));
        let mut siblings = Vec::with_capacity(DEPTH);
        sparse_path_rec(0, key, &entries, &mut siblings);

        Witness { siblings }
    }
}

fn sparse_root_rec(prefix: usize, entries: &[(Key, Value)]) -> [u8; 32] {
    if entries.is_empty() {
        return empty_tree_root(DEPTH - prefix);
    }
    if prefix == DEPTH {
        assert_eq!(entries.len(), 1);
        return leaf_hash(entries[0].1);
    }
    // partition the entries
    let (left, right): (Vec<_>, Vec<_>) =
        entries.iter().copied().partition(|(k, _)| !bit(prefix, k));

    merkle::node(
        sparse_root_rec(prefix + 1, &left),
        sparse_root_rec(prefix + 1, &right),
    )
}

/// Sibling digests from the leaf up to the root.
///
/// The side each sibling sits on is not stored: it is read from the key handed
/// to [`Witness::compute_root`]. A witness taken for one key therefore yields a
/// root that does not match when used for any other key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    siblings: Vec<[u8; 32]>,
}

impl Witness {
    pub fn siblings(&self) -> &[[u8; 32]] {
        &self.siblings
    }

    pub fn path(&self, key: &Key) -> impl Iterator<Item = PathNode> + '_ {
        let key = *key;
        self.siblings.iter().take(DEPTH).enumerate().map(move |(h, sibling)| {
            // the sibling at height h hangs off the node at depth DEPTH - 1 - h
            if bit(DEPTH - 1 - h, &key) {
                PathNode::Left(*sibling)
            } else {
                PathNode::Right(*sibling)
            }
        })
    }

    /// Root of the map implied by `key` holding `value`, all other keys as witnessed.
    pub fn compute_root(&self, key: &Key, value: Value) -> [u8; 32] {
        merkle::path_root(leaf_hash(value), self.path(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn random_hash() -> [u8; 32] {
        rand::random()
    }

    fn random_map(n: usize) -> SparseMerkleMap {
        let mut map = SparseMerkleMap::new();
        for i in 0..n {
            map.set(random_hash(), (i % 3 + 1) as u64);
        }
        map
    }

    #[test]
    fn test_membership_witness() {
        let map = random_map(10);
        let root = map.root();

        for (k, v) in map.iter() {
            let witness = map.witness(k);
            assert_eq!(witness.siblings().len(), DEPTH);
            assert_eq!(witness.compute_root(k, *v), root);
            assert_ne!(witness.compute_root(k, 0), root);
        }
    }

    #[test]
    fn test_non_membership_witness() {
        let map = random_map(10);
        let root = map.root();

        for _ in 0..10 {
            let key = random_hash();
            assert_eq!(map.get(&key), 0);
            let witness = map.witness(&key);
            assert_eq!(witness.compute_root(&key, 0), root);
            assert_ne!(witness.compute_root(&key, 1), root);
        }
    }

    #[test]
    fn test_witness_predicts_root_after_update() {
        let mut map = random_map(5);
        let key = random_hash();

        let witness = map.witness(&key);
        let predicted = witness.compute_root(&key, 2);

        map.set(key, 2);
        assert_eq!(map.root(), predicted);

        // the same witness still proves membership of the new value
        assert_eq!(witness.compute_root(&key, 2), map.root());
    }

    #[test]
    fn test_witness_bound_to_its_key() {
        let map = random_map(5);
        let key = random_hash();
        let other = random_hash();

        let witness = map.witness(&key);
        assert_eq!(witness.compute_root(&key, 0), map.root());
        assert_ne!(witness.compute_root(&other, 0), map.root());
    }

    #[test]
    fn test_stale_witness_mismatches() {
        let mut map = random_map(3);
        let key = random_hash();
        let stale = map.witness(&key);

        map.set(random_hash(), 1);

        assert_ne!(stale.compute_root(&key, 0), map.root());
        assert_eq!(map.witness(&key).compute_root(&key, 0), map.root());
    }

    #[test]
    fn test_set_zero_removes() {
        let mut map = random_map(4);
        let before = map.root();
        let key = random_hash();

        map.set(key, 3);
        assert_eq!(map.len(), 5);
        assert_ne!(map.root(), before);

        map.set(key, 0);
        assert_eq!(map.len(), 4);
        assert_eq!(map.root(), before);
    }

    #[test]
    fn test_non_membership_in_empty_tree() {
        let map = SparseMerkleMap::new();
        assert_eq!(map.root(), empty_root());

        let witness = map.witness(&[0u8; 32]);
        assert_eq!(witness.compute_root(&[0u8; 32], 0), map.root());

        for (h, sibling) in witness.siblings().iter().enumerate() {
            assert_eq!(*sibling, empty_tree_root(h));
        }
    }

    #[test]
    fn test_root_left_most_occupied() {
        let mut map = SparseMerkleMap::new();
        map.set([0u8; 32], 1);

        // We are constructing the tree:
        //
        //      / \
        //     / \ 0 subtree
        //    / \ 0 subtree
        //   1  0
        let mut expected_root = leaf_hash(1);
        for h in 0..DEPTH {
            expected_root = merkle::node(expected_root, empty_tree_root(h))
        }

        assert_eq!(map.root(), expected_root)
    }

    #[test]
    fn test_root_right_most_occupied() {
        let mut map = SparseMerkleMap::new();
        map.set([255u8; 32], 3);

        //  /\
        // 0 /\
        //  0 /\
        //   0 3
        let mut expected_root = leaf_hash(3);
        for h in 0..DEPTH {
            expected_root = merkle::node(empty_tree_root(h), expected_root)
        }

        assert_eq!(map.root(), expected_root)
    }

    #[test]
    fn test_root_middle_weave_elem() {
        let key = [85u8; 32];
        for i in 0..DEPTH {
            assert_eq!(bit(i, &key), i % 2 == 0);
        }

        let mut map = SparseMerkleMap::new();
        map.set(key, 2);

        let mut expected_root = leaf_hash(2);
        for h in 0..DEPTH {
            if h % 2 == 0 {
                expected_root = merkle::node(expected_root, empty_tree_root(h))
            } else {
                expected_root = merkle::node(empty_tree_root(h), expected_root)
            }
        }
        assert_eq!(map.root(), expected_root)
    }

    #[test]
    fn test_multiple_elems() {
        let mut map = SparseMerkleMap::new();
        map.set([0u8; 32], 1);
        map.set([255u8; 32], 1);

        //     root
        //    /  \
        //   /\  /\
        //  /\0 0 /\
        // 1 0   0 1
        let mut left_root = leaf_hash(1);
        for h in 0..DEPTH - 1 {
            left_root = merkle::node(left_root, empty_tree_root(h))
        }

        let mut right_root = leaf_hash(1);
        for h in 0..DEPTH - 1 {
            right_root = merkle::node(empty_tree_root(h), right_root)
        }

        assert_eq!(map.root(), merkle::node(left_root, right_root))
    }

    #[test]
    fn test_bit() {
        for i in 0..DEPTH {
            assert!(!bit(i, &[0u8; 32]));
            assert!(bit(i, &[255u8; 32]));
            assert_eq!(bit(i, &[85u8; 32]), i % 2 == 0);
        }
    }

    #[test]
    fn test_empty_tree_root() {
        let zero = leaf_hash(0);
        assert_eq!(empty_tree_root(0), zero);
        assert_eq!(empty_tree_root(1), merkle::node(zero, zero));
        assert_eq!(
            empty_tree_root(2),
            merkle::node(merkle::node(zero, zero), merkle::node(zero, zero)),
        );
    }

    proptest! {
        #[test]
        fn root_is_independent_of_insertion_order(
            entries in proptest::collection::btree_map(any::<[u8; 32]>(), 1u64..4, 0..6)
        ) {
            let mut forward = SparseMerkleMap::new();
            for (k, v) in entries.iter() {
                forward.set(*k, *v);
            }

            let mut backward = SparseMerkleMap::new();
            for (k, v) in entries.iter().rev() {
                backward.set(*k, *v);
            }

            prop_assert_eq!(forward.root(), backward.root());
        }

        #[test]
        fn witness_update_matches_replica(
            entries in proptest::collection::btree_map(any::<[u8; 32]>(), 1u64..4, 0..5),
            key in any::<[u8; 32]>(),
            value in 0u64..4,
        ) {
            let mut map = SparseMerkleMap::new();
            for (k, v) in entries {
                map.set(k, v);
            }

            let witness = map.witness(&key);
            prop_assert_eq!(witness.compute_root(&key, map.get(&key)), map.root());

            let predicted = witness.compute_root(&key, value);
            map.set(key, value);
            prop_assert_eq!(predicted, map.root());
        }
    }
}
