use crate::{Digest, Hash};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

pub fn leaf(data: &[u8]) -> [u8; 32] {
    let mut hasher = Hash::new();
    hasher.update(b"NOMIX_MERKLE_LEAF");
    hasher.update(data);
    hasher.finalize().into()
}

pub fn node(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hasher = Hash::new();
    hasher.update(b"NOMIX_MERKLE_NODE");
    hasher.update(a);
    hasher.update(b);
    hasher.finalize().into()
}

pub type Path = Vec<PathNode>;

/// A sibling on the way from a leaf to the root, tagged with the side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathNode {
    Left([u8; 32]),
    Right([u8; 32]),
}

pub fn path_root(leaf: [u8; 32], path: impl IntoIterator<Item: Borrow<PathNode>>) -> [u8; 32] {
    let mut computed_hash = leaf;

    for path_node in path.into_iter() {
        match path_node.borrow() {
            PathNode::Left(sibling_hash) => {
                computed_hash = node(sibling_hash, computed_hash);
            }
            PathNode::Right(sibling_hash) => {
                computed_hash = node(computed_hash, sibling_hash);
            }
        }
    }

    computed_hash
}
