//! Edge and its scalar code.

use serde::{Deserialize, Serialize};

/// An ordered pair of node ids. Orientation matters for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub src: u32,
    pub dst: u32,
}

impl Edge {
    pub fn new(src: u32, dst: u32) -> Self {
        Self { src, dst }
    }

    /// The same edge pointing the other way.
    pub fn reversed(self) -> Self {
        Self { src: self.dst, dst: self.src }
    }

    pub fn is_self_loop(self) -> bool {
        self.src == self.dst
    }

    /// Largest endpoint id.
    pub fn max_node(self) -> u32 {
        self.src.max(self.dst)
    }
}

impl From<(u32, u32)> for Edge {
    fn from((src, dst): (u32, u32)) -> Self {
        Self { src, dst }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.src, self.dst)
    }
}

/// Scalar code of one ordered edge under the Cantor pairing.
///
/// Two edges with equal codes are the same edge, so codes can be sorted,
/// hashed and deduplicated in place of the pairs they stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairCode(pub u64);

impl std::fmt::Display for PairCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
