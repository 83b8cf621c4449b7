use ndarray::Array2;

pub(crate) const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Cell {
    weight: f64,
    count: f64,
    nbr: usize,
    next: usize,
}

/// Fixed-capacity pool of linked-list cells holding one mutable adjacency
/// column per vertex during elimination.
///
/// Freed cells are recycled through a circular first-in-first-out queue,
/// so the pool only needs to cover the peak number of simultaneously live
/// entries, not the total number ever added. Running out of cells is a
/// hard error: the build must be restarted with a larger pool.
#[derive(Debug)]
pub struct ColumnArena {
    cells: Vec<Cell>,
    first: Vec<usize>,
    last: Vec<usize>,
    free: Vec<usize>,
    left: usize,
    right: usize,
    available: usize,
}

/// Caller-owned scratch for [`ColumnArena::purge`]. The `val`/`mult`
/// accumulators are kept zeroed between calls; the `weights`/`mults`/
/// `inds` buffers hold the drained column until the next purge.
#[derive(Debug)]
pub struct PurgeScratch {
    val: Vec<f64>,
    mult: Vec<f64>,
    pub weights: Vec<f64>,
    pub mults: Vec<f64>,
    pub inds: Vec<usize>,
}

impl PurgeScratch {
    pub fn new(n: usize) -> PurgeScratch {
        PurgeScratch {
            val: vec![0.0; n],
            mult: vec![0.0; n],
            weights: Vec::new(),
            mults: Vec::new(),
            inds: Vec::new(),
        }
    }
}

impl ColumnArena {
    /// Creates empty per-vertex lists backed by `capacity` free cells.
    pub fn new(n: usize, capacity: usize) -> ColumnArena {
        ColumnArena {
            cells: vec![
                Cell {
                    weight: 0.0,
                    count: 0.0,
                    nbr: NIL,
                    next: NIL,
                };
                capacity
            ],
            first: vec![NIL; n],
            last: vec![NIL; n],
            free: (0..capacity).collect(),
            left: 0,
            right: 0,
            available: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.free.len()
    }

    pub fn available(&self) -> usize {
        self.available
    }

    /// Appends `(weight, count, nbr)` at the tail of `v`'s list.
    ///
    /// Panics when the pool is exhausted.
    pub fn add(&mut self, v: usize, weight: f64, count: f64, nbr: usize) {
        if self.available == 0 {
            panic!("column arena exhausted at {} cells", self.capacity());
        }
        let cell = self.free[self.left];
        self.left = modulo_next(self.left, self.free.len());
        self.available -= 1;

        self.cells[cell] = Cell {
            weight,
            count,
            nbr,
            next: NIL,
        };
        if self.last[v] == NIL {
            self.first[v] = cell;
        } else {
            let last = self.last[v];
            self.cells[last].next = cell;
        }
        self.last[v] = cell;
    }

    /// Drains `v`'s list, coalescing multi-edges to the same neighbor.
    ///
    /// Fills `scratch.weights`/`mults`/`inds` with one entry per distinct
    /// neighbor; when `cap` is given as `(xhat, rho)`, each coalesced
    /// multiplicity is capped at `rho * weight * ||xhat[v] - xhat[u]||^2`.
    /// Returns `(diag, mult_sum, distinct)` where `diag` is the total
    /// weight drained. Every drained cell goes back on the free queue.
    pub fn purge(
        &mut self,
        v: usize,
        scratch: &mut PurgeScratch,
        cap: Option<(&Array2<f64>, f64)>,
    ) -> (f64, f64, usize) {
        scratch.weights.clear();
        scratch.mults.clear();
        scratch.inds.clear();

        let mut diag = 0.0;
        let mut cell = self.first[v];
        while cell != NIL {
            let Cell {
                weight,
                count,
                nbr,
                next,
            } = self.cells[cell];
            debug_assert!(nbr != v, "self entry in column {}", v);
            debug_assert!(nbr > v, "stale neighbor {} in column {}", nbr, v);
            if scratch.val[nbr] == 0.0 {
                scratch.inds.push(nbr);
            }
            scratch.val[nbr] += weight;
            scratch.mult[nbr] += count;
            diag += weight;

            self.free[self.right] = cell;
            self.right = modulo_next(self.right, self.free.len());
            self.available += 1;
            cell = next;
        }
        self.first[v] = NIL;
        self.last[v] = NIL;

        let mut mult_sum = 0.0;
        for &nbr in &scratch.inds {
            let weight = scratch.val[nbr];
            let mut count = scratch.mult[nbr];
            if let Some((xhat, rho)) = cap {
                let mut dist2 = 0.0;
                for t in 0..xhat.ncols() {
                    let diff = xhat[[v, t]] - xhat[[nbr, t]];
                    dist2 += diff * diff;
                }
                count = count.min(rho * weight * dist2);
            }
            scratch.weights.push(weight);
            scratch.mults.push(count);
            mult_sum += count;
            scratch.val[nbr] = 0.0;
            scratch.mult[nbr] = 0.0;
        }
        (diag, mult_sum, scratch.inds.len())
    }
}

fn modulo_next(cursor: usize, capacity: usize) -> usize {
    if cursor + 1 == capacity {
        0
    } else {
        cursor + 1
    }
}
