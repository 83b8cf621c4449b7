mod akpw;
mod tree;

pub use akpw::*;
pub use tree::*;

use petgraph::visit::{IntoEdges, IntoNodeIdentifiers};
use petgraph_sparse::CsGraph;
use std::hash::Hash;

/// Builds a low-stretch spanning tree of a petgraph graph.
///
/// Convenience wrapper around [`low_stretch_tree`] that converts the
/// graph with [`CsGraph::from_graph`] first. Vertices are numbered in
/// identifier-iteration order, matching the returned tree's numbering.
pub fn low_stretch_tree_graph<G, F>(graph: G, length: F) -> CsGraph
where
    G: IntoEdges + IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    F: FnMut(G::EdgeRef) -> f64,
{
    low_stretch_tree(&CsGraph::from_graph(graph, length))
}
