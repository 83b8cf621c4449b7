use crate::CsGraph;

/// Rule for combining duplicate entries in an [`EdgeList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Duplicate weights are added. Used for Laplacian edge weights.
    Sum,
    /// The heaviest duplicate wins. Used for cluster-quotient graphs.
    Max,
}

/// Unordered triplet form of a weighted graph.
///
/// Entries may repeat the same unordered vertex pair; `compress` folds
/// them with a [`Merge`] rule before conversion to CSC.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    pub n: usize,
    pub i: Vec<usize>,
    pub j: Vec<usize>,
    pub v: Vec<f64>,
}

impl EdgeList {
    pub fn new(n: usize) -> EdgeList {
        EdgeList {
            n,
            i: Vec::new(),
            j: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    pub fn push(&mut self, i: usize, j: usize, v: f64) {
        self.i.push(i);
        self.j.push(j);
        self.v.push(v);
    }

    /// Coalesces duplicate unordered pairs with the given rule.
    pub fn compress(&self, merge: Merge) -> EdgeList {
        let mut entries = (0..self.len())
            .map(|k| {
                let (i, j) = (self.i[k].min(self.j[k]), self.i[k].max(self.j[k]));
                (i, j, self.v[k])
            })
            .collect::<Vec<_>>();
        entries.sort_by_key(|&(i, j, _)| (i, j));

        let mut compressed = EdgeList::new(self.n);
        for (i, j, v) in entries {
            let duplicate = compressed
                .len()
                .checked_sub(1)
                .map(|last| compressed.i[last] == i && compressed.j[last] == j)
                .unwrap_or(false);
            if duplicate {
                let last = compressed.len() - 1;
                compressed.v[last] = match merge {
                    Merge::Sum => compressed.v[last] + v,
                    Merge::Max => compressed.v[last].max(v),
                };
            } else {
                compressed.push(i, j, v);
            }
        }
        compressed
    }

    pub fn to_graph(&self) -> CsGraph {
        let edges = (0..self.len())
            .map(|k| (self.i[k], self.j[k], self.v[k]))
            .collect::<Vec<_>>();
        CsGraph::from_edges(self.n, &edges)
    }
}
