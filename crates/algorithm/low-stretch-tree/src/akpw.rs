use ordered_float::OrderedFloat;
use petgraph_sparse::{connected_components, CsGraph};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const UNASSIGNED: usize = usize::MAX;

/// An edge of the current recursion level, carrying the index of the
/// original graph edge it descends from.
#[derive(Debug, Clone, Copy)]
struct LevelEdge {
    i: usize,
    j: usize,
    w: f64,
    original: usize,
}

/// Builds a low-stretch spanning tree by recursive cluster contraction.
///
/// Each level clusters the heaviest band of edges by reciprocal-weight
/// Dijkstra growth with boundary/volume control, contracts the clusters,
/// and recurses on the quotient graph. The returned tree is a symmetric
/// `CsGraph` with exactly `n - 1` edges whose weights match the input.
///
/// Panics if the input graph is disconnected.
pub fn low_stretch_tree(graph: &CsGraph) -> CsGraph {
    let n = graph.node_count();
    let (count, _) = connected_components(graph);
    if count != 1 {
        panic!(
            "low-stretch tree requires a connected graph, found {} components",
            count
        );
    }

    let edges = graph.edges().collect::<Vec<_>>();
    let level = edges
        .iter()
        .enumerate()
        .map(|(k, &(i, j, w))| LevelEdge {
            i,
            j,
            w,
            original: k,
        })
        .collect::<Vec<_>>();

    let mut chosen = Vec::with_capacity(n.saturating_sub(1));
    cluster_level(n, level, &mut chosen);
    debug_assert_eq!(chosen.len(), n.saturating_sub(1));

    let tree_edges = chosen.iter().map(|&k| edges[k]).collect::<Vec<_>>();
    CsGraph::from_edges(n, &tree_edges)
}

/// One level of the recursion: grow clusters over the heavy band, record
/// the growth edges, contract, and recurse on the quotient.
fn cluster_level(n: usize, edges: Vec<LevelEdge>, chosen: &mut Vec<usize>) {
    if n <= 1 {
        return;
    }

    let mut order = (0..edges.len()).collect::<Vec<_>>();
    order.sort_by_key(|&k| Reverse(OrderedFloat(edges[k].w)));
    let w_max = edges[order[0]].w;
    let x_fac = 1.0 / (2.0 * (n as f64).ln());
    let heavy = order
        .iter()
        .copied()
        .take_while(|&k| edges[k].w > x_fac * w_max)
        .collect::<Vec<_>>();

    // Adjacency restricted to the heavy band.
    let mut adjacency: Vec<Vec<(usize, f64, usize)>> = vec![Vec::new(); n];
    for &k in &heavy {
        let edge = edges[k];
        adjacency[edge.i].push((edge.j, edge.w, k));
        adjacency[edge.j].push((edge.i, edge.w, k));
    }

    let mut cluster = vec![UNASSIGNED; n];
    let mut clusters = 0;
    for &k in &heavy {
        for seed in [edges[k].i, edges[k].j] {
            if cluster[seed] == UNASSIGNED {
                grow_cluster(
                    seed, clusters, x_fac, &adjacency, &edges, &mut cluster, chosen,
                );
                clusters += 1;
            }
        }
    }
    // Vertices the heavy band never reached become their own clusters.
    for v in 0..n {
        if cluster[v] == UNASSIGNED {
            cluster[v] = clusters;
            clusters += 1;
        }
    }
    if clusters == 1 {
        return;
    }

    // Contract: keep between-cluster edges, heaviest parallel edge wins,
    // each carrying its back-pointer to the original graph.
    let mut quotient = edges
        .iter()
        .filter(|e| cluster[e.i] != cluster[e.j])
        .map(|e| LevelEdge {
            i: cluster[e.i].min(cluster[e.j]),
            j: cluster[e.i].max(cluster[e.j]),
            w: e.w,
            original: e.original,
        })
        .collect::<Vec<_>>();
    quotient.sort_by_key(|e| (e.i, e.j, Reverse(OrderedFloat(e.w))));
    quotient.dedup_by_key(|e| (e.i, e.j));

    cluster_level(clusters, quotient, chosen);
}

/// Grows one cluster from `seed` until its external boundary weight drops
/// to at most `x_fac` times its volume, or the frontier drains.
///
/// Every admitted edge joins the cluster to a previously unassigned
/// vertex; boundary (weight from the cluster to unassigned vertices) and
/// volume (weight incident on the cluster) are maintained per admission.
fn grow_cluster(
    seed: usize,
    c: usize,
    x_fac: f64,
    adjacency: &[Vec<(usize, f64, usize)>],
    edges: &[LevelEdge],
    cluster: &mut [usize],
    chosen: &mut Vec<usize>,
) {
    cluster[seed] = c;
    let mut volume = 0.0;
    let mut boundary = 0.0;
    let mut frontier = BinaryHeap::new();
    for &(u, w, k) in &adjacency[seed] {
        volume += w;
        if cluster[u] == UNASSIGNED {
            boundary += w;
            frontier.push((Reverse(OrderedFloat(1.0 / w)), u, k));
        }
    }

    while boundary > x_fac * volume {
        let Some((Reverse(OrderedFloat(d)), u, via)) = frontier.pop() else {
            break;
        };
        if cluster[u] != UNASSIGNED {
            continue;
        }
        cluster[u] = c;
        chosen.push(edges[via].original);
        for &(x, w, k) in &adjacency[u] {
            volume += w;
            if cluster[x] == c {
                boundary -= w;
            } else if cluster[x] == UNASSIGNED {
                boundary += w;
                frontier.push((Reverse(OrderedFloat(d + 1.0 / w)), x, k));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use petgraph_sparse::connected_components;

    fn grid(rows: usize, cols: usize) -> CsGraph {
        let mut edges = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let v = r * cols + c;
                if c + 1 < cols {
                    edges.push((v, v + 1, 1.0));
                }
                if r + 1 < rows {
                    edges.push((v, v + cols, 1.0));
                }
            }
        }
        CsGraph::from_edges(rows * cols, &edges)
    }

    #[test]
    fn test_tree_is_spanning() {
        let graph = grid(4, 5);
        let tree = low_stretch_tree(&graph);
        assert_eq!(tree.node_count(), 20);
        assert_eq!(tree.edge_count(), 19);
        let (count, _) = connected_components(&tree);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_tree_weights_match_original() {
        let graph = CsGraph::from_edges(
            4,
            &[(0, 1, 2.0), (1, 2, 0.5), (2, 3, 4.0), (3, 0, 1.0), (0, 2, 3.0)],
        );
        let tree = low_stretch_tree(&graph);
        assert_eq!(tree.edge_count(), 3);
        for (i, j, w) in tree.edges() {
            let original = graph
                .neighbors(i)
                .find(|&(u, _)| u == j)
                .map(|(_, w)| w)
                .expect("tree edge not present in the graph");
            assert_eq!(w, original);
        }
    }

    #[test]
    fn test_single_edge_graph() {
        let graph = CsGraph::from_edges(2, &[(0, 1, 3.0)]);
        let tree = low_stretch_tree(&graph);
        assert_eq!(tree.edge_count(), 1);
        assert_eq!(tree.neighbors(0).collect::<Vec<_>>(), vec![(1, 3.0)]);
    }

    #[test]
    #[should_panic(expected = "connected")]
    fn test_disconnected_input_panics() {
        let graph = CsGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
        low_stretch_tree(&graph);
    }
}
