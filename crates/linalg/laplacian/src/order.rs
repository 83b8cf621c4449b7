use crate::DegreeQueue;
use petgraph_algorithm_low_stretch_tree::TreeParents;
use petgraph_sparse::CsGraph;

/// How to pick the next vertex to eliminate. All policies eliminate tree
/// leaves first and leave the root implicitly last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Leaves in increasing graph degree.
    MinDegree,
    /// Like `MinDegree`, but each pop bumps its graph-neighbors' keys by
    /// two to model fill-in.
    ApproxFill,
    /// Reverse depth-first preorder of the tree.
    Dfs,
}

/// Produces the elimination order for `graph` guided by its spanning
/// tree: a permutation of all vertices except the root, leaves first.
pub fn elimination_order(
    graph: &CsGraph,
    parents: &TreeParents,
    policy: OrderPolicy,
) -> Vec<usize> {
    match policy {
        OrderPolicy::MinDegree => leaf_order(graph, parents, false),
        OrderPolicy::ApproxFill => leaf_order(graph, parents, true),
        OrderPolicy::Dfs => dfs_order(parents),
    }
}

/// Shared queue loop: pop the queued leaf of smallest key, and enqueue a
/// parent the moment it sheds its last child.
fn leaf_order(graph: &CsGraph, parents: &TreeParents, model_fill: bool) -> Vec<usize> {
    let n = graph.node_count();
    let root = parents.root();
    let mut children = parents.child_counts().to_vec();
    let mut key = (0..n).map(|v| graph.degree(v)).collect::<Vec<_>>();
    let mut in_queue = vec![false; n];
    let mut queue = DegreeQueue::new(n);
    for v in 0..n {
        if v != root && parents.is_leaf(v) {
            queue.insert(v, key[v]);
            in_queue[v] = true;
        }
    }

    let mut order = Vec::with_capacity(n.saturating_sub(1));
    while !queue.is_empty() {
        let u = queue.pop_min();
        in_queue[u] = false;
        order.push(u);
        if model_fill {
            for (x, _) in graph.neighbors(u) {
                key[x] += 2;
                if in_queue[x] {
                    queue.inc(x);
                    queue.inc(x);
                }
            }
        }
        let p = parents.parent(u);
        children[p] -= 1;
        if children[p] == 0 && p != root {
            queue.insert(p, key[p]);
            in_queue[p] = true;
        }
    }
    order
}

/// Reverse preorder of a depth-first walk from the root, root dropped.
fn dfs_order(parents: &TreeParents) -> Vec<usize> {
    let n = parents.node_count();
    let root = parents.root();
    let mut child_lists = vec![Vec::new(); n];
    for v in 0..n {
        if v != root {
            child_lists[parents.parent(v)].push(v);
        }
    }
    let mut preorder = Vec::with_capacity(n);
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        preorder.push(v);
        stack.extend(child_lists[v].iter().copied());
    }
    preorder[1..].iter().rev().copied().collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use petgraph_algorithm_low_stretch_tree::low_stretch_tree;

    fn ring(n: usize) -> CsGraph {
        let edges = (0..n).map(|v| (v, (v + 1) % n, 1.0)).collect::<Vec<_>>();
        CsGraph::from_edges(n, &edges)
    }

    fn is_permutation_without_root(order: &[usize], n: usize, root: usize) -> bool {
        let mut seen = vec![false; n];
        for &v in order {
            if v == root || seen[v] {
                return false;
            }
            seen[v] = true;
        }
        order.len() == n - 1
    }

    #[test]
    fn test_orders_are_permutations() {
        let graph = ring(12);
        let tree = low_stretch_tree(&graph);
        let parents = TreeParents::new(&tree, 11);
        for policy in [OrderPolicy::MinDegree, OrderPolicy::ApproxFill, OrderPolicy::Dfs] {
            let order = elimination_order(&graph, &parents, policy);
            assert!(
                is_permutation_without_root(&order, 12, 11),
                "{:?} is not a root-free permutation",
                policy
            );
        }
    }

    #[test]
    fn test_leaves_come_before_parents() {
        let graph = ring(16);
        let tree = low_stretch_tree(&graph);
        let parents = TreeParents::new(&tree, 15);
        let order = elimination_order(&graph, &parents, OrderPolicy::MinDegree);
        let mut position = vec![usize::MAX; 16];
        for (k, &v) in order.iter().enumerate() {
            position[v] = k;
        }
        for v in 0..15 {
            let p = parents.parent(v);
            if p != 15 {
                assert!(position[v] < position[p], "parent {} popped before {}", p, v);
            }
        }
    }

    #[test]
    fn test_dfs_order_ends_near_root() {
        // A path tree rooted at one end: reverse preorder walks back
        // from the far leaf.
        let path = CsGraph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let parents = TreeParents::new(&path, 3);
        let order = elimination_order(&path, &parents, OrderPolicy::Dfs);
        assert_eq!(order, vec![0, 1, 2]);
    }
}
