//! Graph reconciliation: label predicted edges against a truth graph.
//!
//! ```text
//!   P ──► CSR(P) ─┬─ P ∘ T   exact-orientation matches
//!   T ──► CSR(T) ─┼─ P ∘ Tᵀ  reverse-orientation matches
//!                 └─ P ∘ Pᵀ  predicted in both orientations
//! ```
//!
//! Every distinct predicted position is emitted once, row-major, labeled
//! true when the truth holds it in either orientation. When both
//! orientations were predicted and the pair is a match, only one survives:
//! the orientation present in the truth, or the `src < dst` one when the
//! truth holds both. Unmatched reverse pairs are both kept as false edges.

use crate::model::{Edge, EdgeSet, LabeledEdgeSet};
use crate::sparse::CsrMatrix;
use crate::Result;

/// Reconcile over the smallest id space holding both edge sets.
pub fn reconcile(predicted: &EdgeSet, truth: &EdgeSet) -> Result<LabeledEdgeSet> {
    let n = predicted.id_space().max(truth.id_space());
    reconcile_with_bound(predicted, truth, n)
}

/// Reconcile over an explicit id space `[0, n)`. Any endpoint `>= n` in
/// either set fails with `NodeOutOfBounds` before any matrix is built.
pub fn reconcile_with_bound(
    predicted: &EdgeSet,
    truth: &EdgeSet,
    n: usize,
) -> Result<LabeledEdgeSet> {
    predicted.check_bounds(n)?;
    truth.check_bounds(n)?;

    let p = CsrMatrix::from_edges(predicted, n)?;
    let t = CsrMatrix::from_edges(truth, n)?;

    let exact = p.hadamard(&t)?;
    let reverse = p.hadamard(&t.transpose())?;
    let mirrored = p.hadamard(&p.transpose())?;

    let mut edges = EdgeSet::with_capacity(p.nnz());
    let mut labels = Vec::with_capacity(p.nnz());
    let mut collapsed = 0usize;

    for (i, j, _) in p.iter() {
        let forward = exact.contains(i, j);
        let backward = reverse.contains(i, j);
        let matched = forward || backward;

        if matched && i != j && mirrored.contains(i, j) {
            let keep = forward && (!backward || i < j);
            if !keep {
                collapsed += 1;
                continue;
            }
        }

        edges.push(Edge::new(i, j));
        labels.push(matched);
    }

    let labeled = LabeledEdgeSet::new(edges, labels)?;
    tracing::debug!(
        predicted = predicted.len(),
        distinct = p.nnz(),
        collapsed,
        kept = labeled.len(),
        matched = labeled.true_count(),
        "reconciled predicted edges against truth"
    );
    Ok(labeled)
}
