//! Edge-set algebra over `PairCode` arrays.
//!
//! Every operation is a hash-set membership pass over scalar codes, so
//! cost is linear in the number of edges (plus a sort for the
//! deduplicating forms). Results of `unique`, `union`, `intersection`
//! and `difference` are sorted ascending by code; `isin` keeps input
//! order.

use hashbrown::HashSet;

use crate::codec;
use crate::model::{EdgeSet, PairCode};
use crate::Result;

/// Membership index over a code array.
#[derive(Debug, Clone, Default)]
pub struct CodeSet {
    codes: HashSet<PairCode>,
}

impl CodeSet {
    pub fn from_codes(codes: &[PairCode]) -> Self {
        Self { codes: codes.iter().copied().collect() }
    }

    /// Encode and index an edge set.
    pub fn from_edges(edges: &EdgeSet) -> Result<Self> {
        Ok(Self::from_codes(&codec::encode_all(edges)?))
    }

    #[inline]
    pub fn contains(&self, code: PairCode) -> bool {
        self.codes.contains(&code)
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Sorted distinct codes.
pub fn unique(codes: &[PairCode]) -> Vec<PairCode> {
    let mut out = codes.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

/// Codes present in either input.
pub fn union(a: &[PairCode], b: &[PairCode]) -> Vec<PairCode> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out.sort_unstable();
    out.dedup();
    out
}

/// Codes present in both inputs.
pub fn intersection(a: &[PairCode], b: &[PairCode]) -> Vec<PairCode> {
    let index = CodeSet::from_codes(b);
    let mut out = unique(a);
    out.retain(|&c| index.contains(c));
    out
}

/// Codes of `a` absent from `b`.
pub fn difference(a: &[PairCode], b: &[PairCode]) -> Vec<PairCode> {
    let index = CodeSet::from_codes(b);
    let mut out = unique(a);
    out.retain(|&c| !index.contains(c));
    out
}

/// Element-wise membership mask of `codes` in `set`, input order.
pub fn isin(codes: &[PairCode], set: &CodeSet) -> Vec<bool> {
    codes.iter().map(|&c| set.contains(c)).collect()
}

/// Encode an edge set to codes, input order.
pub fn encode_edges(edges: &EdgeSet) -> Result<Vec<PairCode>> {
    codec::encode_all(edges)
}

/// Map codes back to explicit edges, input order.
pub fn decode_back(codes: &[PairCode]) -> Result<EdgeSet> {
    codec::decode_all(codes)
}
