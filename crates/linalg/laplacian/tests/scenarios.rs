use ndarray::Array1;
use petgraph_linalg_laplacian::{
    solve_components, Factorization, LaplacianSolver, SolveOptions, SolverOptions,
};
use petgraph_sparse::{CsGraph, Laplacian};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

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

fn relative_residual(graph: &CsGraph, x: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let laplacian = Laplacian::new(graph);
    let mut r = Array1::zeros(b.len());
    laplacian.residual(x, b, &mut r);
    r.dot(&r).sqrt() / b.dot(b).sqrt()
}

fn solve_with(
    graph: &CsGraph,
    b: &Array1<f64>,
    factorization: Factorization,
    tol: f64,
    max_iters: usize,
    seed: u64,
) -> (Array1<f64>, usize) {
    let options = SolverOptions {
        factorization,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let solver = LaplacianSolver::new(graph, &options, &mut rng);
    let solve_options = SolveOptions {
        tol,
        max_iters,
        ..Default::default()
    };
    let (x, status) = solver.solve(b, &solve_options);
    assert!(
        status.converged(),
        "{:?} stopped at {:?} with residual {:e}",
        factorization,
        status,
        relative_residual(graph, &x, b)
    );
    (x, status.iterations())
}

#[test]
fn test_path_graph_exact() {
    let graph = CsGraph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
    let b = Array1::from_vec(vec![1.0, 0.0, 0.0, -1.0]);
    for factorization in [Factorization::Edge, Factorization::Vertex] {
        let (x, iterations) = solve_with(&graph, &b, factorization, 1e-10, 10, 1);
        let expected = [1.5, 0.5, -0.5, -1.5];
        for i in 0..4 {
            assert!((x[i] - expected[i]).abs() < 1e-9, "x = {:?}", x);
        }
        assert!(iterations <= 3, "{} iterations on a path", iterations);
    }
}

#[test]
fn test_complete_graph_k5() {
    let mut edges = Vec::new();
    for i in 0..5 {
        for j in (i + 1)..5 {
            edges.push((i, j, 1.0));
        }
    }
    let graph = CsGraph::from_edges(5, &edges);
    let b = Array1::from_vec(vec![4.0, -1.0, -1.0, -1.0, -1.0]);
    for factorization in [Factorization::Edge, Factorization::Vertex] {
        let (x, iterations) = solve_with(&graph, &b, factorization, 1e-12, 10, 2);
        // On K5 the centered Laplacian acts as 5I, so x = b / 5 and the
        // Krylov space closes within the quotient dimension.
        for i in 0..5 {
            assert!((x[i] - b[i] / 5.0).abs() < 1e-9, "x = {:?}", x);
        }
        assert!(iterations <= 6, "{} iterations on K5", iterations);
    }
}

#[test]
fn test_grid_10x10_random_rhs() {
    let graph = grid(10, 10);
    let mut rng = StdRng::seed_from_u64(42);
    let mut b = Array1::from_shape_fn(100, |_| rng.gen_range(-1.0..1.0));
    let mean = b.sum() / 100.0;
    b -= mean;
    for factorization in [Factorization::Edge, Factorization::Vertex] {
        let (x, _) = solve_with(&graph, &b, factorization, 1e-6, 30, 7);
        assert!(relative_residual(&graph, &x, &b) <= 1e-6);
        assert!(x.sum().abs() < 1e-8);
    }
}

#[test]
fn test_ring_effective_resistance() {
    let n = 1000;
    let edges = (0..n).map(|v| (v, (v + 1) % n, 1.0)).collect::<Vec<_>>();
    let graph = CsGraph::from_edges(n, &edges);
    let mut b = Array1::zeros(n);
    b[0] = 1.0;
    b[500] = -1.0;
    let (x, _) = solve_with(&graph, &b, Factorization::Edge, 1e-8, 200, 3);
    // Two arcs of 500 unit resistors in parallel: 250 ohms end to end.
    assert!((x[0] - x[500] - 250.0).abs() < 0.1, "gap = {}", x[0] - x[500]);
}

#[test]
fn test_disjoint_triangles_solved_per_component() {
    let graph = CsGraph::from_edges(
        6,
        &[
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 0, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (5, 3, 1.0),
        ],
    );
    let b = Array1::from_vec(vec![1.0, -0.5, -0.5, 2.0, -2.0, 0.0]);
    let mut rng = StdRng::seed_from_u64(11);
    let (x, statuses) = solve_components(
        &graph,
        &b,
        &SolverOptions::default(),
        &SolveOptions::default(),
        &mut rng,
    );
    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|s| s.converged()));
    let first: f64 = x[0] + x[1] + x[2];
    let second: f64 = x[3] + x[4] + x[5];
    assert!(first.abs() < 1e-9, "first component mean {}", first);
    assert!(second.abs() < 1e-9, "second component mean {}", second);
    assert!(relative_residual(&graph, &x, &b) < 1e-6);
}

#[test]
fn test_solve_is_idempotent() {
    let graph = grid(6, 6);
    let mut b = Array1::from_shape_fn(36, |i| ((i * 7 + 3) % 11) as f64 - 5.0);
    let mean = b.sum() / 36.0;
    b -= mean;
    let options = SolverOptions::default();
    let mut rng = StdRng::seed_from_u64(19);
    let solver = LaplacianSolver::new(&graph, &options, &mut rng);
    let solve_options = SolveOptions {
        tol: 1e-10,
        ..Default::default()
    };
    let (x1, _) = solver.solve(&b, &solve_options);

    let laplacian = Laplacian::new(&graph);
    let mut lx1 = Array1::zeros(36);
    laplacian.multiply(&x1, &mut lx1);
    let (x2, _) = solver.solve(&lx1, &solve_options);
    for i in 0..36 {
        assert!((x1[i] - x2[i]).abs() < 1e-6, "drift at {}", i);
    }
}

#[test]
fn test_weighted_graph_within_tolerance() {
    // Weights spread across [0.1, 10] with both factorization flavors.
    let mut rng = StdRng::seed_from_u64(23);
    let graph = {
        let mut edges = Vec::new();
        for r in 0..8 {
            for c in 0..8 {
                let v = r * 8 + c;
                if c + 1 < 8 {
                    edges.push((v, v + 1, rng.gen_range(0.1..10.0)));
                }
                if r + 1 < 8 {
                    edges.push((v, v + 8, rng.gen_range(0.1..10.0)));
                }
            }
        }
        CsGraph::from_edges(64, &edges)
    };
    let mut b = Array1::from_shape_fn(64, |_| rng.gen_range(-1.0..1.0));
    let mean = b.sum() / 64.0;
    b -= mean;
    for (factorization, tol) in [
        (Factorization::Edge, 1e-2),
        (Factorization::Edge, 1e-6),
        (Factorization::Vertex, 1e-2),
        (Factorization::Vertex, 1e-6),
    ] {
        let (x, _) = solve_with(&graph, &b, factorization, tol, 200, 29);
        assert!(relative_residual(&graph, &x, &b) <= tol);
    }
}
