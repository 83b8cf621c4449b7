use crate::mirror::{MirrorArena, MirrorCell};
use crate::solve::{backward_sweep, forward_sweep};
use crate::DegreeQueue;
use ndarray::Array1;
use petgraph_sparse::CsGraph;
use rand::Rng;

/// Compact descriptor of the edge-elimination factorization.
///
/// `col` lists the eliminated vertices in order; `colptr` frames each
/// vertex's `(rowval, fval)` split fractions, the last of which is
/// always the unit sink entry; `d` holds the residual diagonal, zero at
/// the one never-eliminated vertex.
#[derive(Debug, Clone)]
pub struct EdgeFactor {
    pub(crate) n: usize,
    pub(crate) col: Vec<usize>,
    pub(crate) colptr: Vec<usize>,
    pub(crate) rowval: Vec<usize>,
    pub(crate) fval: Vec<f64>,
    pub(crate) d: Vec<f64>,
    pub(crate) root: usize,
}

/// Factorizes by repeated 2-edge splits: the minimum-degree vertex is
/// popped, its live column compressed, and each entry but the last is
/// split against a weight-proportional partner drawn from the suffix of
/// the column's cumulative sums. New edges land on both endpoints'
/// mirrored lists as they are created.
pub fn factorize_edge<R: Rng>(graph: &CsGraph, rng: &mut R) -> EdgeFactor {
    let n = graph.node_count();
    let mut arena = MirrorArena::new(graph);
    let degrees = (0..n).map(|v| graph.degree(v)).collect::<Vec<_>>();
    let mut queue = DegreeQueue::from_keys(&degrees);

    let mut col = Vec::with_capacity(n.saturating_sub(1));
    let mut colptr = Vec::with_capacity(n);
    let mut rowval = Vec::new();
    let mut fval = Vec::new();
    let mut d = vec![0.0; n];

    let mut colspace: Vec<usize> = Vec::new();
    let mut vals: Vec<f64> = Vec::new();
    let mut cumspace: Vec<f64> = Vec::new();

    for _ in 0..n.saturating_sub(1) {
        let i = queue.pop_min();
        col.push(i);
        colptr.push(rowval.len());

        arena.live_column(i, &mut colspace);
        compress_column(&mut arena, &mut colspace, &mut queue);
        let len = colspace.len();
        assert!(
            len > 0,
            "vertex {} ran out of edges, the graph must be connected",
            i
        );

        vals.clear();
        cumspace.clear();
        let mut csum = 0.0;
        for &cell in colspace.iter() {
            csum += arena.cells[cell].val;
            vals.push(arena.cells[cell].val);
            cumspace.push(csum);
        }
        let mut wdeg = csum;
        let mut colscale = 1.0;

        for joffset in 0..len - 1 {
            let cell = colspace[joffset];
            let j = arena.cells[cell].row;
            let rev = arena.cells[cell].reverse;
            let w = vals[joffset] * colscale;
            let f = w / wdeg;

            let lo = cumspace[joffset];
            let koff = if csum > lo {
                let r = rng.gen_range(lo..csum);
                joffset + 1 + cumspace[joffset + 1..].partition_point(|&c| c <= r)
            } else {
                len - 1
            };
            let k_row = arena.cells[colspace[koff]].row;

            // The split replaces the eliminated edge (i, j) with an edge
            // (j, k_row): the mirror cell in j's list is rewritten in
            // place and a fresh twin is prepended to k_row's list.
            let new_val = f * (1.0 - f) * wdeg;
            let twin = arena.cells.len();
            arena.cells.push(MirrorCell {
                val: new_val,
                row: j,
                next: arena.head[k_row],
                reverse: rev,
            });
            arena.head[k_row] = twin;
            arena.cells[rev].val = new_val;
            arena.cells[rev].row = k_row;
            arena.cells[rev].reverse = twin;
            queue.inc(k_row);

            colscale *= 1.0 - f;
            wdeg *= (1.0 - f) * (1.0 - f);
            rowval.push(j);
            fval.push(f);
        }

        // The heaviest-suffix survivor absorbs the leftover mass.
        let cell = colspace[len - 1];
        let j = arena.cells[cell].row;
        let w = vals[len - 1] * colscale;
        let rev = arena.cells[cell].reverse;
        arena.cells[rev].val = 0.0;
        arena.cells[cell].val = 0.0;
        queue.dec(j);
        rowval.push(j);
        fval.push(1.0);
        d[i] = w;
    }
    colptr.push(rowval.len());
    let root = if n == 0 { 0 } else { queue.pop_min() };

    EdgeFactor {
        n,
        col,
        colptr,
        rowval,
        fval,
        d,
        root,
    }
}

/// Sums duplicate rows within a drained column. The losing cell and its
/// mirror are zeroed, and the duplicated neighbor's degree key drops.
fn compress_column(arena: &mut MirrorArena, colspace: &mut Vec<usize>, queue: &mut DegreeQueue) {
    colspace.sort_by_key(|&cell| arena.cells[cell].row);
    let mut out = 0;
    for idx in 0..colspace.len() {
        let cell = colspace[idx];
        let row = arena.cells[cell].row;
        if out > 0 && arena.cells[colspace[out - 1]].row == row {
            let kept = colspace[out - 1];
            arena.cells[kept].val += arena.cells[cell].val;
            let rev = arena.cells[cell].reverse;
            arena.cells[rev].val = 0.0;
            arena.cells[cell].val = 0.0;
            queue.dec(row);
        } else {
            colspace[out] = cell;
            out += 1;
        }
    }
    colspace.truncate(out);
}

impl EdgeFactor {
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Vertices in elimination order; the root is absent.
    pub fn elimination_order(&self) -> &[usize] {
        &self.col
    }

    /// The one vertex never eliminated.
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn diagonal(&self) -> &[f64] {
        &self.d
    }

    /// Stored split entries of the descriptor.
    pub fn nnz(&self) -> usize {
        self.rowval.len()
    }

    /// Applies the factorization as an approximate Laplacian inverse:
    /// forward sweep, diagonal scale where nonzero, backward sweep,
    /// remove the mean.
    pub fn apply(&self, b: &Array1<f64>) -> Array1<f64> {
        let mut y = b.clone();
        forward_sweep(self, &mut y);
        for i in 0..self.n {
            if self.d[i] != 0.0 {
                y[i] /= self.d[i];
            }
        }
        backward_sweep(self, &mut y);
        let mean = y.sum() / self.n as f64;
        y -= mean;
        y
    }
}
