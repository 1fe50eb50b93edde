//! # PairCodec: Cantor Pairing for Edges
//!
//! Maps an ordered pair of node ids to one scalar and back:
//!
//! ```text
//! encode(a, b) = b + (a + b)(a + b + 1) / 2
//!
//!        b→  0   1   2   3
//!   a↓  0    0   2   5   9
//!       1    1   4   8
//!       2    3   7
//!       3    6
//! ```
//!
//! Codes are order-sensitive: `encode(a, b) != encode(b, a)` unless `a == b`.
//!
//! # Numeric boundary
//!
//! The inverse finds the triangular index `w = ⌊(√(8z+1) − 1) / 2⌋` through
//! an f64 square root. Once `8z + 1` no longer fits the 53-bit mantissa the
//! rounded root can land on the next integer just below a triangular
//! number, and `w` comes out one too large.
//!
//! | Constant | Value | Meaning |
//! |----------|-------|---------|
//! | `MAX_SAFE_CODE` | 2^53 − 1 | every code up to here decodes exactly |
//! | `FIRST_UNSAFE_CODE` | 9 007 199 321 849 855 | smallest code the f64 root gets wrong, `= encode(0, 134 217 727)` |
//! | `MAX_NODE_ID` | 2^26 − 1 | any pair of ids up to here encodes at or below `MAX_SAFE_CODE` |
//!
//! `encode` rejects ids above `MAX_NODE_ID`, `decode` rejects codes above
//! `MAX_SAFE_CODE`, and an off-by-one root is caught by checked
//! subtraction. Nothing is silently mis-decoded.

use rand::Rng;

use crate::model::{Edge, EdgeSet, PairCode};
use crate::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Largest code guaranteed to decode exactly through the f64 root.
pub const MAX_SAFE_CODE: u64 = (1 << 53) - 1;

/// Smallest code whose f64 root is off by one: `T(2^27) − 1`.
pub const FIRST_UNSAFE_CODE: u64 = 9_007_199_321_849_855;

/// Largest node id accepted by `encode`.
pub const MAX_NODE_ID: u32 = (1 << 26) - 1;

/// Default sample count for the startup round-trip check.
pub const DEFAULT_SELF_CHECK_SAMPLES: usize = 1_000;

// ============================================================================
// Encode / decode
// ============================================================================

/// Encode an ordered pair.
pub fn encode(a: u32, b: u32) -> Result<PairCode> {
    if a > MAX_NODE_ID || b > MAX_NODE_ID {
        return Err(Error::NumericBoundary(format!(
            "pair ({a}, {b}) exceeds max node id {MAX_NODE_ID}"
        )));
    }
    let (a, b) = (a as u64, b as u64);
    let s = a + b;
    Ok(PairCode(b + s * (s + 1) / 2))
}

#[inline]
pub fn encode_edge(edge: Edge) -> Result<PairCode> {
    encode(edge.src, edge.dst)
}

/// Decode a code back to its ordered pair.
pub fn decode(code: PairCode) -> Result<Edge> {
    if code.0 > MAX_SAFE_CODE {
        return Err(Error::NumericBoundary(format!(
            "code {code} exceeds max safe code {MAX_SAFE_CODE}"
        )));
    }
    invert(code.0)
}

/// Encode every edge, preserving order.
pub fn encode_all(edges: &EdgeSet) -> Result<Vec<PairCode>> {
    edges.iter().map(|&e| encode_edge(e)).collect()
}

/// Decode every code, preserving order.
pub fn decode_all(codes: &[PairCode]) -> Result<EdgeSet> {
    codes.iter().map(|&c| decode(c)).collect()
}

/// `⌊(√(8z+1) − 1) / 2⌋` through f64.
#[inline]
fn triangular_root(z: u64) -> u64 {
    let x = z.saturating_mul(8).saturating_add(1) as f64;
    (0.5 * (x.sqrt() - 1.0)).floor() as u64
}

/// Inverse without the range guard. A wrong root makes either `z − T(w)`
/// or `w − b` negative.
fn invert(z: u64) -> Result<Edge> {
    let w = triangular_root(z);
    let t = w * (w + 1) / 2;
    let pair = z
        .checked_sub(t)
        .and_then(|b| w.checked_sub(b).map(|a| (a, b)))
        .and_then(|(a, b)| Some((u32::try_from(a).ok()?, u32::try_from(b).ok()?)));

    pair.map(|(a, b)| Edge::new(a, b)).ok_or_else(|| {
        Error::NumericBoundary(format!(
            "code {z} lost precision in the f64 inverse (triangular root {w})"
        ))
    })
}

// ============================================================================
// Startup self-check
// ============================================================================

/// Round-trip `samples` random pairs drawn from `[0, bound)²`, plus the
/// corner `(bound − 1, bound − 1)`.
pub fn self_check<R: Rng + ?Sized>(rng: &mut R, samples: usize, bound: u32) -> Result<()> {
    if bound == 0 || bound - 1 > MAX_NODE_ID {
        return Err(Error::NumericBoundary(format!(
            "self-check bound {bound} outside 1..={}",
            MAX_NODE_ID as u64 + 1
        )));
    }

    let corner = (bound - 1, bound - 1);
    let pairs = (0..samples)
        .map(|_| (rng.gen_range(0..bound), rng.gen_range(0..bound)))
        .chain(std::iter::once(corner));

    for (a, b) in pairs {
        let back = decode(encode(a, b)?)?;
        if back != Edge::new(a, b) {
            return Err(Error::NumericBoundary(format!(
                "pair ({a}, {b}) decoded as {back}"
            )));
        }
    }

    tracing::debug!(samples, bound, "pair codec self-check passed");
    Ok(())
}
