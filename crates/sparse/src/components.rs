use crate::CsGraph;
use petgraph::unionfind::UnionFind;

/// Labels the connected components of a graph using Union-Find.
///
/// Returns the number of components and a per-vertex label in
/// `0..count`, numbered in order of first appearance.
///
/// # Examples
///
/// ```
/// use petgraph_sparse::{connected_components, CsGraph};
///
/// let graph = CsGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
/// let (count, labels) = connected_components(&graph);
/// assert_eq!(count, 2);
/// assert_eq!(labels, vec![0, 0, 1, 1]);
/// ```
pub fn connected_components(graph: &CsGraph) -> (usize, Vec<usize>) {
    let n = graph.node_count();
    let mut components = UnionFind::new(n);
    for (i, j, _) in graph.edges() {
        components.union(i, j);
    }
    let mut labels = vec![usize::MAX; n];
    let mut count = 0;
    for v in 0..n {
        let root = components.find(v);
        if labels[root] == usize::MAX {
            labels[root] = count;
            count += 1;
        }
        labels[v] = labels[root];
    }
    (count, labels)
}

/// One connected component extracted as its own graph, with the map back
/// to the parent graph's vertex numbering.
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// `vertices[local] = global`.
    pub vertices: Vec<usize>,
    pub graph: CsGraph,
}

/// Splits a graph into its connected components as induced subgraphs.
pub fn split_components(graph: &CsGraph) -> Vec<Subgraph> {
    let n = graph.node_count();
    let (count, labels) = connected_components(graph);
    let mut vertices = vec![Vec::new(); count];
    let mut local = vec![0; n];
    for v in 0..n {
        local[v] = vertices[labels[v]].len();
        vertices[labels[v]].push(v);
    }
    let mut edges = vec![Vec::new(); count];
    for (i, j, w) in graph.edges() {
        edges[labels[i]].push((local[i], local[j], w));
    }
    vertices
        .into_iter()
        .zip(edges)
        .map(|(vertices, edges)| {
            let graph = CsGraph::from_edges(vertices.len(), &edges);
            Subgraph { vertices, graph }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_connected_components() {
        let graph = CsGraph::from_edges(
            5,
            &[(0, 1, 1.0), (0, 2, 1.0), (1, 2, 1.0), (3, 4, 1.0)],
        );
        let (count, labels) = connected_components(&graph);
        assert_eq!(count, 2);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_ne!(labels[2], labels[3]);
        assert_eq!(labels[3], labels[4]);
    }

    #[test]
    fn test_isolated_vertex_is_own_component() {
        let graph = CsGraph::from_edges(3, &[(0, 1, 1.0)]);
        let (count, labels) = connected_components(&graph);
        assert_eq!(count, 2);
        assert_eq!(labels, vec![0, 0, 1]);
    }

    #[test]
    fn test_split_components() {
        let graph = CsGraph::from_edges(5, &[(0, 3, 2.0), (1, 2, 1.0), (2, 4, 1.0)]);
        let parts = split_components(&graph);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].vertices, vec![0, 3]);
        assert_eq!(parts[1].vertices, vec![1, 2, 4]);
        assert_eq!(parts[0].graph.edge_count(), 1);
        assert_eq!(parts[1].graph.edge_count(), 2);
        assert_eq!(parts[0].graph.weighted_degree(0), 2.0);
    }
}
