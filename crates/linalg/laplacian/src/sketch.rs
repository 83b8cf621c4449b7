use crate::{pcg, PcgOptions};
use ndarray::{Array1, Array2};
use petgraph_sparse::{CsGraph, Laplacian};
use rand::Rng;

/// Johnson-Lindenstrauss sketch of the effective-resistance embedding:
/// `k` projected columns of `W^{1/2} B L^+`, one row per vertex, so that
/// `||xhat[u] - xhat[v]||^2` estimates the effective resistance between
/// `u` and `v`.
///
/// Each projection solves one Laplacian system with a random signed
/// combination of the incidence rows on the right-hand side, using
/// Jacobi-preconditioned CG at loose tolerance.
pub fn resistance_sketch<R: Rng>(graph: &CsGraph, k: usize, rng: &mut R) -> Array2<f64> {
    let n = graph.node_count();
    let laplacian = Laplacian::new(graph);
    let degrees = laplacian.degrees().to_vec();
    let scale = 1.0 / (k as f64).sqrt();
    let options = PcgOptions {
        tol: 1e-4,
        max_iters: 300,
        ..Default::default()
    };

    let mut xhat = Array2::zeros((n, k));
    for t in 0..k {
        let mut rhs = Array1::zeros(n);
        for (i, j, w) in graph.edges() {
            let q = if rng.gen::<bool>() { scale } else { -scale };
            let s = w.sqrt() * q;
            rhs[i] += s;
            rhs[j] -= s;
        }
        let (z, _) = pcg(&laplacian, &rhs, |r| jacobi(r, &degrees), &options);
        for v in 0..n {
            xhat[[v, t]] = z[v];
        }
    }
    xhat
}

/// Diagonal preconditioner, re-centered to stay orthogonal to the
/// all-ones null vector.
fn jacobi(r: &Array1<f64>, degrees: &[f64]) -> Array1<f64> {
    let mut z = Array1::from_shape_fn(r.len(), |i| r[i] / degrees[i]);
    let mean = z.sum() / z.len() as f64;
    z -= mean;
    z
}
