use crate::{
    edge_condition_estimate, elimination_order, factorize_edge, factorize_vertex, pcg,
    resistance_sketch, vertex_condition_estimate, EdgeFactor, OrderPolicy, PcgOptions, PcgStatus,
    VertexFactor,
};
use log::debug;
use ndarray::Array1;
use petgraph::visit::{IntoEdges, IntoNodeIdentifiers};
use petgraph_algorithm_low_stretch_tree::{low_stretch_tree, TreeParents};
use petgraph_sparse::{connected_components, split_components, CsGraph, Laplacian};
use rand::Rng;
use std::hash::Hash;
use std::time::Duration;

/// Which approximate factorization backs the preconditioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factorization {
    /// Sampled vertex elimination ordered along a low-stretch tree.
    Vertex,
    /// Edge-split elimination driven by the dynamic degree queue.
    Edge,
}

/// Build-time parameters. `Default` gives the edge-split factorization
/// with a minimum-degree ordering and no condition check.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub factorization: Factorization,
    pub order: OrderPolicy,
    /// Cell-pool capacity for vertex elimination; proportional to the
    /// stored-entry count when absent.
    pub pool_size: Option<usize>,
    /// Cap coalesced multiplicities using a resistance sketch.
    pub cap_edges: bool,
    pub rho: f64,
    pub sketch_dim: usize,
    /// Estimate the preconditioner quality after the build.
    pub check_condition: bool,
    pub cond_tol: f64,
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            factorization: Factorization::Edge,
            order: OrderPolicy::MinDegree,
            pool_size: None,
            cap_edges: false,
            rho: 8.0,
            sketch_dim: 4,
            check_condition: false,
            cond_tol: 1e-2,
            verbose: false,
        }
    }
}

/// Per-solve parameters.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub tol: f64,
    pub max_iters: usize,
    pub max_time: Option<Duration>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            tol: 1e-6,
            max_iters: 1000,
            max_time: None,
        }
    }
}

/// The built factorization, either flavor.
#[derive(Debug, Clone)]
pub enum Preconditioner {
    Vertex(VertexFactor),
    Edge(EdgeFactor),
}

impl Preconditioner {
    pub fn apply(&self, b: &Array1<f64>) -> Array1<f64> {
        match self {
            Preconditioner::Vertex(factor) => factor.apply(b),
            Preconditioner::Edge(factor) => factor.apply(b),
        }
    }

    /// Vertices in the order they were eliminated.
    pub fn elimination_order(&self) -> &[usize] {
        match self {
            Preconditioner::Vertex(factor) => factor.permutation(),
            Preconditioner::Edge(factor) => factor.elimination_order(),
        }
    }
}

/// A Laplacian solver for one connected graph: an approximate
/// factorization owned for the lifetime of the solver, applied as the
/// PCG preconditioner on every solve.
#[derive(Debug)]
pub struct LaplacianSolver {
    graph: CsGraph,
    factor: Preconditioner,
    condition: Option<(f64, usize)>,
    verbose: bool,
}

impl LaplacianSolver {
    /// Builds the factorization. All-or-nothing: panics on disconnected
    /// input, malformed weights, or cell-pool exhaustion.
    pub fn new<R: Rng>(graph: &CsGraph, options: &SolverOptions, rng: &mut R) -> LaplacianSolver {
        let n = graph.node_count();
        let (components, _) = connected_components(graph);
        if components != 1 {
            panic!(
                "laplacian solver requires a connected graph, found {} components",
                components
            );
        }

        let factor = match options.factorization {
            Factorization::Edge => Preconditioner::Edge(factorize_edge(graph, rng)),
            Factorization::Vertex => {
                let tree = low_stretch_tree(graph);
                let parents = TreeParents::new(&tree, n - 1);
                let order = elimination_order(graph, &parents, options.order);
                let pool = options.pool_size.unwrap_or(8 * graph.nnz() + n + 64);
                let xhat = options
                    .cap_edges
                    .then(|| resistance_sketch(graph, options.sketch_dim, rng));
                let cap = xhat.as_ref().map(|xhat| (xhat, options.rho));
                Preconditioner::Vertex(factorize_vertex(graph, &parents, &order, pool, cap, rng))
            }
        };
        if options.verbose {
            debug!(
                "factorized {} vertices / {} edges with {:?}",
                n,
                graph.edge_count(),
                options.factorization
            );
        }

        let condition = if options.check_condition {
            let estimate = match &factor {
                Preconditioner::Edge(factor) => {
                    edge_condition_estimate(graph, factor, options.cond_tol, 1000, rng)
                }
                Preconditioner::Vertex(factor) => {
                    vertex_condition_estimate(graph, factor, options.cond_tol, 1000, rng)
                }
            };
            if options.verbose {
                debug!("condition estimate {:?}", estimate);
            }
            Some(estimate)
        } else {
            None
        };

        LaplacianSolver {
            graph: graph.clone(),
            factor,
            condition,
            verbose: options.verbose,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn factor(&self) -> &Preconditioner {
        &self.factor
    }

    pub fn elimination_order(&self) -> &[usize] {
        self.factor.elimination_order()
    }

    /// `(lambda, iterations)` from the build-time error check, when
    /// requested.
    pub fn condition_estimate(&self) -> Option<(f64, usize)> {
        self.condition
    }

    /// Best-effort PCG solve of `Lx = b`. The right-hand side is
    /// centered first; the returned vector has zero mean.
    pub fn solve(&self, b: &Array1<f64>, options: &SolveOptions) -> (Array1<f64>, PcgStatus) {
        let n = self.graph.node_count();
        assert_eq!(b.len(), n, "right-hand side length mismatch");
        let mean = b.sum() / n as f64;
        let centered = b - mean;
        let laplacian = Laplacian::new(&self.graph);
        let pcg_options = PcgOptions {
            tol: options.tol,
            max_iters: options.max_iters,
            max_time: options.max_time,
            verbose: self.verbose,
        };
        pcg(&laplacian, &centered, |r| self.factor.apply(r), &pcg_options)
    }
}

/// Solves a possibly disconnected system by decomposing into connected
/// components, solving each on its induced subgraph, and reassembling
/// by vertex index. One status per component, in label order.
pub fn solve_components<R: Rng>(
    graph: &CsGraph,
    b: &Array1<f64>,
    solver_options: &SolverOptions,
    solve_options: &SolveOptions,
    rng: &mut R,
) -> (Array1<f64>, Vec<PcgStatus>) {
    assert_eq!(b.len(), graph.node_count(), "right-hand side length mismatch");
    let mut x = Array1::zeros(graph.node_count());
    let mut statuses = Vec::new();
    for part in split_components(graph) {
        let local_b = Array1::from_shape_fn(part.vertices.len(), |k| b[part.vertices[k]]);
        let solver = LaplacianSolver::new(&part.graph, solver_options, rng);
        let (local_x, status) = solver.solve(&local_b, solve_options);
        for (k, &v) in part.vertices.iter().enumerate() {
            x[v] = local_x[k];
        }
        statuses.push(status);
    }
    (x, statuses)
}

/// Builds a [`LaplacianSolver`] straight from a petgraph graph,
/// numbering vertices in identifier-iteration order.
pub fn laplacian_solver<G, F, R>(
    graph: G,
    length: F,
    options: &SolverOptions,
    rng: &mut R,
) -> LaplacianSolver
where
    G: IntoEdges + IntoNodeIdentifiers,
    G::NodeId: Eq + Hash,
    F: FnMut(G::EdgeRef) -> f64,
    R: Rng,
{
    LaplacianSolver::new(&CsGraph::from_graph(graph, length), options, rng)
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_build_and_solve_both_factorizations() {
        let graph = CsGraph::from_edges(
            5,
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 0, 1.0)],
        );
        let b = array![1.0, 0.0, 0.0, 0.0, -1.0];
        for factorization in [Factorization::Edge, Factorization::Vertex] {
            let options = SolverOptions {
                factorization,
                ..Default::default()
            };
            let mut rng = StdRng::seed_from_u64(4);
            let solver = LaplacianSolver::new(&graph, &options, &mut rng);
            let (x, status) = solver.solve(&b, &SolveOptions::default());
            assert!(status.converged(), "{:?} did not converge", factorization);
            assert!(x.sum().abs() < 1e-9);
        }
    }

    #[test]
    fn test_condition_estimate_reported() {
        let graph = CsGraph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)]);
        let options = SolverOptions {
            check_condition: true,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(31);
        let solver = LaplacianSolver::new(&graph, &options, &mut rng);
        let (lambda, _) = solver.condition_estimate().unwrap();
        assert!(lambda.is_finite());
    }

    #[test]
    #[should_panic(expected = "connected")]
    fn test_disconnected_build_panics() {
        let graph = CsGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        LaplacianSolver::new(&graph, &SolverOptions::default(), &mut rng);
    }

    #[test]
    fn test_petgraph_entry() {
        use petgraph::graph::UnGraph;
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let nodes = (0..4).map(|_| graph.add_node(())).collect::<Vec<_>>();
        for k in 0..4 {
            graph.add_edge(nodes[k], nodes[(k + 1) % 4], 1.0);
        }
        let mut rng = StdRng::seed_from_u64(2);
        let solver = laplacian_solver(&graph, |e| *e.weight(), &SolverOptions::default(), &mut rng);
        assert_eq!(solver.node_count(), 4);
    }
}
