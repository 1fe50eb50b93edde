//! Compressed sparse row adjacency over an `N × N` node space.
//!
//! Stores only present edges: memory is `O(N + nnz)`, never `O(N²)`.
//! Duplicate entries are summed at construction, so `data` holds
//! multiplicities. Column indices are sorted within each row.

use crate::model::{Edge, EdgeSet};
use crate::{Error, Result};

/// Square CSR matrix of edge multiplicities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMatrix {
    n: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<u32>,
}

impl CsrMatrix {
    /// Build from an edge list over `[0, n)`. Any endpoint `>= n` is a
    /// bounds violation.
    pub fn from_edges(edges: &EdgeSet, n: usize) -> Result<Self> {
        edges.check_bounds(n)?;

        // Bucket columns by row (counting sort on src)
        let mut starts = vec![0usize; n + 1];
        for e in edges {
            starts[e.src as usize + 1] += 1;
        }
        for r in 0..n {
            starts[r + 1] += starts[r];
        }
        let mut cursor = starts.clone();
        let mut cols = vec![0u32; edges.len()];
        for e in edges {
            let slot = &mut cursor[e.src as usize];
            cols[*slot] = e.dst;
            *slot += 1;
        }

        // Sort each row and fold duplicates into counts
        let mut indptr = Vec::with_capacity(n + 1);
        let mut indices = Vec::with_capacity(cols.len());
        let mut data = Vec::with_capacity(cols.len());
        indptr.push(0);
        for r in 0..n {
            let row_start = indices.len();
            let row = &mut cols[starts[r]..starts[r + 1]];
            row.sort_unstable();
            for &c in row.iter() {
                if indices.len() > row_start && indices.last() == Some(&c) {
                    if let Some(count) = data.last_mut() {
                        *count += 1;
                    }
                } else {
                    indices.push(c);
                    data.push(1);
                }
            }
            indptr.push(indices.len());
        }

        Ok(Self { n, indptr, indices, data })
    }

    /// Side length of the node space.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored (distinct) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Column indices and counts of one row.
    pub fn row(&self, r: usize) -> (&[u32], &[u32]) {
        if r >= self.n {
            return (&[], &[]);
        }
        let span = self.indptr[r]..self.indptr[r + 1];
        (&self.indices[span.clone()], &self.data[span])
    }

    /// Multiplicity of `(r, c)`, zero when absent.
    pub fn get(&self, r: u32, c: u32) -> u32 {
        let (cols, counts) = self.row(r as usize);
        match cols.binary_search(&c) {
            Ok(i) => counts[i],
            Err(_) => 0,
        }
    }

    #[inline]
    pub fn contains(&self, r: u32, c: u32) -> bool {
        self.get(r, c) > 0
    }

    /// Entries as `(row, col, count)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        (0..self.n).flat_map(move |r| {
            let (cols, counts) = self.row(r);
            cols.iter().zip(counts).map(move |(&c, &v)| (r as u32, c, v))
        })
    }

    /// Distinct stored positions as edges, row-major.
    pub fn to_edges(&self) -> EdgeSet {
        self.iter().map(|(r, c, _)| Edge::new(r, c)).collect()
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        let mut indptr = vec![0usize; self.n + 1];
        for &c in &self.indices {
            indptr[c as usize + 1] += 1;
        }
        for r in 0..self.n {
            indptr[r + 1] += indptr[r];
        }
        let mut cursor = indptr.clone();
        let mut indices = vec![0u32; self.nnz()];
        let mut data = vec![0u32; self.nnz()];
        // Row-major traversal keeps the new columns sorted
        for (r, c, v) in self.iter() {
            let slot = &mut cursor[c as usize];
            indices[*slot] = r;
            data[*slot] = v;
            *slot += 1;
        }
        Self { n: self.n, indptr, indices, data }
    }

    /// Element-wise product. Non-zero exactly where both matrices are.
    pub fn hadamard(&self, other: &CsrMatrix) -> Result<Self> {
        if self.n != other.n {
            return Err(Error::DimensionMismatch { expected: self.n, got: other.n });
        }
        let mut indptr = Vec::with_capacity(self.n + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for r in 0..self.n {
            let (ac, av) = self.row(r);
            let (bc, bv) = other.row(r);
            let (mut i, mut j) = (0, 0);
            while i < ac.len() && j < bc.len() {
                match ac[i].cmp(&bc[j]) {
                    std::cmp::Ordering::Less => i += 1,
                    std::cmp::Ordering::Greater => j += 1,
                    std::cmp::Ordering::Equal => {
                        indices.push(ac[i]);
                        data.push(av[i] * bv[j]);
                        i += 1;
                        j += 1;
                    }
                }
            }
            indptr.push(indices.len());
        }
        Ok(Self { n: self.n, indptr, indices, data })
    }
}
