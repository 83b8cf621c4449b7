use crate::arena::NIL;
use crate::{AliasTable, ColumnArena, PurgeScratch};
use ndarray::{Array1, Array2};
use petgraph_algorithm_low_stretch_tree::TreeParents;
use petgraph_sparse::CsGraph;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// CSC storage of one triangular factor. Unit diagonals are stored
/// explicitly; rows within a column follow emission order.
#[derive(Debug, Clone)]
pub(crate) struct Triangular {
    pub colptr: Vec<usize>,
    pub rowval: Vec<usize>,
    pub nzval: Vec<f64>,
}

impl Triangular {
    fn column(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.colptr[i]..self.colptr[i + 1];
        self.rowval[range.clone()]
            .iter()
            .copied()
            .zip(self.nzval[range].iter().copied())
    }
}

/// Approximate `L D L^T` factorization built by sampled vertex
/// elimination, stored as both triangular orientations plus the
/// diagonal, all in elimination-permuted numbering.
#[derive(Debug, Clone)]
pub struct VertexFactor {
    perm: Vec<usize>,
    pos: Vec<usize>,
    lower: Triangular,
    upper: Triangular,
    d: Vec<f64>,
}

/// Eliminates vertices in `order` (root last), replacing each clique of
/// fill-in by an unbiased sparse sample.
///
/// Small cliques (degree at most 3) are emitted exactly. Larger ones
/// emit the spanning-tree edges among the neighbors in full, then
/// `degree` sampled pairs: one endpoint from a weighted alias draw, the
/// other from a uniform random permutation, each sampled edge weighted
/// `w_j w_k / (w_j + w_k)` so the clique is matched in expectation.
pub fn factorize_vertex<R: Rng>(
    graph: &CsGraph,
    parents: &TreeParents,
    order: &[usize],
    pool_size: usize,
    cap: Option<(&Array2<f64>, f64)>,
    rng: &mut R,
) -> VertexFactor {
    let n = graph.node_count();
    debug_assert_eq!(order.len(), n - 1);

    let mut perm = order.to_vec();
    perm.push(parents.root());
    let mut pos = vec![0; n];
    for (k, &v) in perm.iter().enumerate() {
        pos[v] = k;
    }

    // The sketch is row-per-original-vertex; elimination talks in
    // permuted indices, so reorder it once up front.
    let permuted_cap = cap.map(|(xhat, rho)| {
        let mut permuted = Array2::zeros((n, xhat.ncols()));
        for v in 0..n {
            for t in 0..xhat.ncols() {
                permuted[[pos[v], t]] = xhat[[v, t]];
            }
        }
        (permuted, rho)
    });
    let cap = permuted_cap.as_ref().map(|(xhat, rho)| (xhat, *rho));

    let mut arena = ColumnArena::new(n, pool_size);
    for (a, b, w) in graph.edges() {
        let (pa, pb) = (pos[a].min(pos[b]), pos[a].max(pos[b]));
        arena.add(pa, w, 1.0, pb);
    }

    let mut scratch = PurgeScratch::new(n);
    let mut slot = vec![NIL; n];
    let mut seen = HashSet::new();
    let mut triples: Vec<(usize, usize, f64)> = Vec::with_capacity(graph.nnz() + n);
    let mut d = vec![0.0; n];

    for i in 0..n {
        let (wsum, _mult_sum, deg) = arena.purge(i, &mut scratch, cap);
        if deg == 0 {
            // Nothing left in this column: the vertex closes out its
            // component. Unit diagonal, zero weight.
            triples.push((i, i, 1.0));
            continue;
        }
        d[i] = wsum;
        for t in 0..deg {
            triples.push((i, scratch.inds[t], -scratch.weights[t] / wsum));
        }
        triples.push((i, i, 1.0));

        if deg <= 3 {
            for a in 0..deg {
                for b in (a + 1)..deg {
                    let w = scratch.weights[a] * scratch.weights[b] / wsum;
                    let (p, q) = ordered(scratch.inds[a], scratch.inds[b]);
                    arena.add(p, w, 1.0, q);
                }
            }
            continue;
        }

        // Tree edges among the neighbors, found through each child's
        // parent pointer so every pair appears exactly once.
        for t in 0..deg {
            slot[scratch.inds[t]] = t;
        }
        seen.clear();
        for t in 0..deg {
            let orig = perm[scratch.inds[t]];
            let parent = parents.parent(orig);
            if parent == orig {
                continue;
            }
            let s = slot[pos[parent]];
            if s != NIL {
                let w = scratch.weights[t] * scratch.weights[s] / wsum;
                let (p, q) = ordered(scratch.inds[t], scratch.inds[s]);
                arena.add(p, w, 1.0, q);
                seen.insert((p, q));
            }
        }

        let table = AliasTable::new(&scratch.weights);
        let mut partner = (0..deg).collect::<Vec<_>>();
        partner.shuffle(rng);
        for t in 0..deg {
            let a_idx = table.sample(rng);
            let b_idx = partner[t];
            if a_idx == b_idx {
                continue;
            }
            let (p, q) = ordered(scratch.inds[a_idx], scratch.inds[b_idx]);
            if seen.contains(&(p, q)) {
                continue;
            }
            let scaling = scratch.weights[a_idx] + scratch.weights[b_idx];
            let w = scratch.weights[a_idx] * scratch.weights[b_idx] / scaling;
            arena.add(p, w, 1.0, q);
        }
        for t in 0..deg {
            slot[scratch.inds[t]] = NIL;
        }
    }

    let lower = assemble_csc(n, &triples, false);
    let upper = assemble_csc(n, &triples, true);
    VertexFactor {
        perm,
        pos,
        lower,
        upper,
        d,
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Two-pass count sort of `(col, row, val)` triples into CSC columns;
/// `transpose` swaps the roles of the indices.
fn assemble_csc(n: usize, triples: &[(usize, usize, f64)], transpose: bool) -> Triangular {
    let mut counts = vec![0usize; n + 1];
    for &(col, row, _) in triples {
        let key = if transpose { row } else { col };
        counts[key + 1] += 1;
    }
    for k in 0..n {
        counts[k + 1] += counts[k];
    }
    let colptr = counts.clone();
    let mut rowval = vec![0usize; triples.len()];
    let mut nzval = vec![0.0; triples.len()];
    for &(col, row, val) in triples {
        let (key, other) = if transpose { (row, col) } else { (col, row) };
        let at = counts[key];
        counts[key] += 1;
        rowval[at] = other;
        nzval[at] = val;
    }
    Triangular {
        colptr,
        rowval,
        nzval,
    }
}

impl VertexFactor {
    pub fn node_count(&self) -> usize {
        self.perm.len()
    }

    /// Elimination order: the original vertex eliminated at each step.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    pub fn diagonal(&self) -> &[f64] {
        &self.d
    }

    /// Forward substitution through the unit-lower factor, in permuted
    /// numbering.
    pub(crate) fn half_forward(&self, y: &mut Array1<f64>) {
        for i in 0..self.node_count() {
            let yi = y[i];
            for (r, val) in self.lower.column(i) {
                if r != i {
                    y[r] -= val * yi;
                }
            }
        }
    }

    /// Backward substitution through the unit-upper transpose, in
    /// permuted numbering.
    pub(crate) fn half_backward(&self, y: &mut Array1<f64>) {
        for i in (0..self.node_count()).rev() {
            let yi = y[i];
            for (r, val) in self.upper.column(i) {
                if r != i {
                    y[r] -= val * yi;
                }
            }
        }
    }

    pub(crate) fn permute(&self, b: &Array1<f64>) -> Array1<f64> {
        let mut y = Array1::zeros(self.node_count());
        for v in 0..self.node_count() {
            y[self.pos[v]] = b[v];
        }
        y
    }

    pub(crate) fn unpermute(&self, y: &Array1<f64>) -> Array1<f64> {
        let mut x = Array1::zeros(self.node_count());
        for v in 0..self.node_count() {
            x[v] = y[self.pos[v]];
        }
        x
    }

    /// Applies the factorization as an approximate Laplacian inverse:
    /// permute, forward solve, diagonal scale, backward solve,
    /// unpermute, remove the mean.
    pub fn apply(&self, b: &Array1<f64>) -> Array1<f64> {
        let n = self.node_count();
        let mut y = self.permute(b);
        self.half_forward(&mut y);
        for i in 0..n {
            if self.d[i] != 0.0 {
                y[i] /= self.d[i];
            } else {
                y[i] = 0.0;
            }
        }
        self.half_backward(&mut y);
        let mut x = self.unpermute(&y);
        let mean = x.sum() / n as f64;
        x -= mean;
        x
    }
}
