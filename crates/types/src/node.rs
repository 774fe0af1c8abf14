//! Hierarchical name identifiers.
//!
//! A [`Node`] is the keccak-256 namehash of a dotted name. Nodes are derived
//! right-to-left: `namehash("a.b") = keccak(namehash("b") || keccak("a"))`,
//! with the empty name mapping to the all-zero root.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use thiserror::Error;

/// Longest single label accepted for hashing.
pub const MAX_LABEL_BYTES: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label must not be empty")]
    Empty,
    #[error("label must not contain '.': {label}")]
    ContainsDot { label: String },
    #[error("label is {len} bytes, limit is {MAX_LABEL_BYTES}")]
    TooLong { len: usize },
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Keccak-256 hash of a single label.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelHash(pub [u8; 32]);

impl LabelHash {
    /// Hash a label after checking it is a single non-empty segment.
    pub fn from_label(label: &str) -> Result<Self, LabelError> {
        if label.is_empty() {
            return Err(LabelError::Empty);
        }
        if label.contains('.') {
            return Err(LabelError::ContainsDot {
                label: label.to_string(),
            });
        }
        if label.len() > MAX_LABEL_BYTES {
            return Err(LabelError::TooLong { len: label.len() });
        }
        Ok(Self(keccak256(label.as_bytes())))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for LabelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelHash(0x{})", hex::encode(self.0))
    }
}

/// Opaque 32-byte identifier of one hierarchical name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Node(pub [u8; 32]);

impl Node {
    pub const ROOT: Node = Node([0u8; 32]);

    /// Derive the child node for `label` under this node.
    pub fn child(&self, label: &LabelHash) -> Node {
        let mut hasher = Keccak256::new();
        hasher.update(self.0);
        hasher.update(label.0);
        Node(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.to_hex())
    }
}

/// Compute the namehash of a dotted name. Empty labels are rejected.
pub fn namehash(name: &str) -> Result<Node, LabelError> {
    if name.is_empty() {
        return Ok(Node::ROOT);
    }
    name.rsplit('.').try_fold(Node::ROOT, |node, label| {
        LabelHash::from_label(label).map(|hash| node.child(&hash))
    })
}
