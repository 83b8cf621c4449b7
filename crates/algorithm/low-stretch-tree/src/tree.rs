use petgraph_sparse::CsGraph;
use std::collections::VecDeque;

/// Rooted parent-array form of a spanning tree.
///
/// The root is its own parent. Resistance distances to the root
/// (sums of `1/w` along tree paths) are precomputed so that pairwise
/// path resistances reduce to a common-ancestor walk.
#[derive(Debug, Clone)]
pub struct TreeParents {
    root: usize,
    parent: Vec<usize>,
    parent_weight: Vec<f64>,
    depth: Vec<usize>,
    resistance: Vec<f64>,
    children: Vec<usize>,
}

impl TreeParents {
    /// Roots `tree` at `root` by breadth-first search.
    ///
    /// Panics if `tree` does not span all vertices.
    pub fn new(tree: &CsGraph, root: usize) -> TreeParents {
        let n = tree.node_count();
        let mut parent = vec![usize::MAX; n];
        let mut parent_weight = vec![0.0; n];
        let mut depth = vec![0; n];
        let mut resistance = vec![0.0; n];
        let mut children = vec![0; n];
        parent[root] = root;
        let mut queue = VecDeque::from([root]);
        let mut visited = 1;
        while let Some(v) = queue.pop_front() {
            for (u, w) in tree.neighbors(v) {
                if parent[u] == usize::MAX && u != root {
                    parent[u] = v;
                    parent_weight[u] = w;
                    depth[u] = depth[v] + 1;
                    resistance[u] = resistance[v] + 1.0 / w;
                    children[v] += 1;
                    visited += 1;
                    queue.push_back(u);
                }
            }
        }
        if visited != n {
            panic!("tree does not span all {} vertices", n);
        }
        TreeParents {
            root,
            parent,
            parent_weight,
            depth,
            resistance,
            children,
        }
    }

    pub fn node_count(&self) -> usize {
        self.parent.len()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn parent(&self, v: usize) -> usize {
        self.parent[v]
    }

    /// Weight of the edge from `v` to its parent. Zero at the root.
    pub fn parent_weight(&self, v: usize) -> f64 {
        self.parent_weight[v]
    }

    /// Number of children of each vertex; leaves hold zero.
    pub fn child_counts(&self) -> &[usize] {
        &self.children
    }

    pub fn is_leaf(&self, v: usize) -> bool {
        self.children[v] == 0
    }

    pub fn is_tree_edge(&self, u: usize, v: usize) -> bool {
        self.parent[u] == v || self.parent[v] == u
    }

    /// Resistance (sum of `1/w`) along the tree path between `u` and `v`.
    pub fn path_resistance(&self, u: usize, v: usize) -> f64 {
        let mut a = u;
        let mut b = v;
        while self.depth[a] > self.depth[b] {
            a = self.parent[a];
        }
        while self.depth[b] > self.depth[a] {
            b = self.parent[b];
        }
        while a != b {
            a = self.parent[a];
            b = self.parent[b];
        }
        self.resistance[u] + self.resistance[v] - 2.0 * self.resistance[a]
    }
}

/// Mean stretch of the non-tree edges of `graph` with respect to `tree`:
/// `w(e)` times the tree-path resistance between the endpoints of `e`.
/// Returns zero when every edge is a tree edge.
pub fn average_stretch(graph: &CsGraph, tree: &CsGraph) -> f64 {
    let parents = TreeParents::new(tree, tree.node_count() - 1);
    let mut total = 0.0;
    let mut count = 0;
    for (i, j, w) in graph.edges() {
        if !parents.is_tree_edge(i, j) {
            total += w * parents.path_resistance(i, j);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
