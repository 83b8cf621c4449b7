use petgraph::visit::{EdgeRef, IntoEdges, IntoNodeIdentifiers};
use std::collections::HashMap;
use std::hash::Hash;

/// Compressed-sparse-column adjacency of an undirected weighted graph.
///
/// Both directions of every edge are stored, so the pattern is symmetric
/// and `nzval` holds `2m` entries for `m` undirected edges. Within each
/// column the row indices are strictly increasing, no self-loop is ever
/// stored, and every weight is finite and positive.
///
/// # Examples
///
/// ```
/// use petgraph_sparse::CsGraph;
///
/// let graph = CsGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 2.0)]);
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![(0, 1.0), (2, 2.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct CsGraph {
    n: usize,
    colptr: Vec<usize>,
    rowval: Vec<usize>,
    nzval: Vec<f64>,
}

impl CsGraph {
    /// Builds a graph from undirected weighted edges. Duplicate pairs are
    /// summed. Panics on self-loops, out-of-range endpoints, and weights
    /// that are not finite and positive.
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> CsGraph {
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for &(i, j, w) in edges {
            if i == j {
                panic!("self loop at vertex {}", i);
            }
            if i >= n || j >= n {
                panic!("edge ({}, {}) out of range for {} vertices", i, j, n);
            }
            if !w.is_finite() || w <= 0.0 {
                panic!("edge ({}, {}) has invalid weight {}", i, j, w);
            }
            adjacency[i].push((j, w));
            adjacency[j].push((i, w));
        }

        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        for column in adjacency.iter_mut() {
            column.sort_by_key(|&(u, _)| u);
            let mut last = usize::MAX;
            for &(u, w) in column.iter() {
                if u == last {
                    *nzval.last_mut().unwrap() += w;
                } else {
                    rowval.push(u);
                    nzval.push(w);
                    last = u;
                }
            }
            colptr.push(rowval.len());
        }

        CsGraph {
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// Converts a petgraph graph into a `CsGraph`, numbering the vertices
    /// in identifier-iteration order.
    pub fn from_graph<G, F>(graph: G, mut length: F) -> CsGraph
    where
        G: IntoEdges + IntoNodeIdentifiers,
        G::NodeId: Eq + Hash,
        F: FnMut(G::EdgeRef) -> f64,
    {
        let indices = graph
            .node_identifiers()
            .enumerate()
            .map(|(i, u)| (u, i))
            .collect::<HashMap<_, _>>();
        let edges = graph
            .edge_references()
            .map(|edge| {
                (
                    indices[&edge.source()],
                    indices[&edge.target()],
                    length(edge),
                )
            })
            .collect::<Vec<_>>();
        CsGraph::from_edges(indices.len(), &edges)
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.rowval.len() / 2
    }

    /// Number of stored entries (twice the edge count).
    pub fn nnz(&self) -> usize {
        self.rowval.len()
    }

    /// Unweighted degree of `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.colptr[v + 1] - self.colptr[v]
    }

    /// Sum of the weights incident on `v`.
    pub fn weighted_degree(&self, v: usize) -> f64 {
        let (_, weights) = self.column(v);
        weights.iter().sum()
    }

    /// The stored column of `v` as parallel row/weight slices, rows
    /// strictly increasing.
    pub fn column(&self, v: usize) -> (&[usize], &[f64]) {
        let range = self.colptr[v]..self.colptr[v + 1];
        (&self.rowval[range.clone()], &self.nzval[range])
    }

    /// Iterates the neighbors of `v` as `(vertex, weight)` pairs.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (rows, weights) = self.column(v);
        rows.iter().copied().zip(weights.iter().copied())
    }

    /// All undirected edges as `(i, j, w)` with `i < j`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n).flat_map(move |i| {
            self.neighbors(i)
                .filter(move |&(j, _)| i < j)
                .map(move |(j, w)| (i, j, w))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use petgraph::graph::UnGraph;

    #[test]
    fn test_from_edges_sums_duplicates() {
        let graph = CsGraph::from_edges(2, &[(0, 1, 1.0), (1, 0, 2.5)]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![(1, 3.5)]);
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![(0, 3.5)]);
    }

    #[test]
    fn test_columns_sorted() {
        let graph = CsGraph::from_edges(4, &[(2, 0, 1.0), (2, 3, 1.0), (2, 1, 1.0)]);
        let (rows, _) = graph.column(2);
        assert_eq!(rows, &[0, 1, 3]);
    }

    #[test]
    #[should_panic(expected = "self loop")]
    fn test_rejects_self_loop() {
        CsGraph::from_edges(2, &[(1, 1, 1.0)]);
    }

    #[test]
    #[should_panic(expected = "invalid weight")]
    fn test_rejects_nonpositive_weight() {
        CsGraph::from_edges(2, &[(0, 1, 0.0)]);
    }

    #[test]
    #[should_panic(expected = "invalid weight")]
    fn test_rejects_nan_weight() {
        CsGraph::from_edges(2, &[(0, 1, f64::NAN)]);
    }

    #[test]
    fn test_from_graph() {
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let u1 = graph.add_node(());
        let u2 = graph.add_node(());
        let u3 = graph.add_node(());
        graph.add_edge(u1, u2, 1.0);
        graph.add_edge(u2, u3, 2.0);
        let sparse = CsGraph::from_graph(&graph, |e| *e.weight());
        assert_eq!(sparse.node_count(), 3);
        assert_eq!(sparse.edge_count(), 2);
        assert_eq!(sparse.weighted_degree(1), 3.0);
    }
}
