use crate::arena::NIL;
use petgraph_sparse::CsGraph;

/// One half of an undirected edge. `reverse` is the arena index of the
/// twin cell on the other endpoint's list; `val == 0.0` marks a dead
/// cell awaiting garbage-skip.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MirrorCell {
    pub val: f64,
    pub row: usize,
    pub next: usize,
    pub reverse: usize,
}

/// Growable adjacency store for edge elimination.
///
/// Every edge is two cells, each holding the arena index of its mirror,
/// so a weight change or deletion on one endpoint is visible from the
/// other in O(1). Cells are addressed by stable indices; the backing
/// vector may relocate but never reuses a slot.
#[derive(Debug)]
pub struct MirrorArena {
    pub(crate) cells: Vec<MirrorCell>,
    pub(crate) head: Vec<usize>,
}

impl MirrorArena {
    pub fn new(graph: &CsGraph) -> MirrorArena {
        let n = graph.node_count();
        let mut arena = MirrorArena {
            cells: Vec::with_capacity(graph.nnz()),
            head: vec![NIL; n],
        };
        for (i, j, w) in graph.edges() {
            arena.add_edge(i, j, w);
        }
        arena
    }

    pub fn node_count(&self) -> usize {
        self.head.len()
    }

    /// Adds a mirrored edge, prepending one cell to each endpoint's list.
    pub fn add_edge(&mut self, u: usize, v: usize, w: f64) {
        let a = self.cells.len();
        let b = a + 1;
        self.cells.push(MirrorCell {
            val: w,
            row: v,
            next: self.head[u],
            reverse: b,
        });
        self.cells.push(MirrorCell {
            val: w,
            row: u,
            next: self.head[v],
            reverse: a,
        });
        self.head[u] = a;
        self.head[v] = b;
    }

    /// Collects the live cells of `v`'s list into `column`, skipping
    /// dead (`val == 0`) entries.
    pub(crate) fn live_column(&self, v: usize, column: &mut Vec<usize>) {
        column.clear();
        let mut cell = self.head[v];
        while cell != NIL {
            if self.cells[cell].val > 0.0 {
                column.push(cell);
            }
            cell = self.cells[cell].next;
        }
    }

    /// Live degree of `v` (linear in the list length; used by tests).
    pub fn live_degree(&self, v: usize) -> usize {
        let mut count = 0;
        let mut cell = self.head[v];
        while cell != NIL {
            if self.cells[cell].val > 0.0 {
                count += 1;
            }
            cell = self.cells[cell].next;
        }
        count
    }
}
