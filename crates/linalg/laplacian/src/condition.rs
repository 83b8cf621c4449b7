use crate::solve::{backward_sweep, forward_sweep};
use crate::{EdgeFactor, VertexFactor};
use log::warn;
use ndarray::Array1;
use petgraph_sparse::{CsGraph, Laplacian};
use rand::Rng;

/// Largest-magnitude eigenvalue of the preconditioned error operator
/// `D^{-1/2} F^{-1} L F^{-T} D^{-1/2} - I` for the edge factorization,
/// with the null coordinate (the never-eliminated root) quotiented out.
///
/// Returns `(lambda, iterations)`; `(0.0, 0)` when the iteration fails
/// to produce a finite estimate.
pub fn edge_condition_estimate<R: Rng>(
    graph: &CsGraph,
    factor: &EdgeFactor,
    tol: f64,
    max_iters: usize,
    rng: &mut R,
) -> (f64, usize) {
    let laplacian = Laplacian::new(graph);
    let scale = half_inverse(factor.diagonal());
    let n = graph.node_count();
    let root = factor.root();
    let apply = |v: &Array1<f64>| {
        let mut u = v.clone();
        rescale(&mut u, &scale);
        backward_sweep(factor, &mut u);
        let mut w = Array1::zeros(n);
        laplacian.multiply(&u, &mut w);
        forward_sweep(factor, &mut w);
        rescale(&mut w, &scale);
        let mut out = w - v;
        out[root] = 0.0;
        out
    };
    finish(power_iteration(n, apply, tol, max_iters, rng))
}

/// As [`edge_condition_estimate`], but conjugated through the vertex
/// factorization's elimination permutation; the null coordinate is the
/// root's slot at the end of the permuted numbering.
pub fn vertex_condition_estimate<R: Rng>(
    graph: &CsGraph,
    factor: &VertexFactor,
    tol: f64,
    max_iters: usize,
    rng: &mut R,
) -> (f64, usize) {
    let laplacian = Laplacian::new(graph);
    let scale = half_inverse(factor.diagonal());
    let n = graph.node_count();
    let apply = |v: &Array1<f64>| {
        let mut u = v.clone();
        rescale(&mut u, &scale);
        factor.half_backward(&mut u);
        let x = factor.unpermute(&u);
        let mut w = Array1::zeros(n);
        laplacian.multiply(&x, &mut w);
        let mut y = factor.permute(&w);
        factor.half_forward(&mut y);
        rescale(&mut y, &scale);
        let mut out = y - v;
        out[n - 1] = 0.0;
        out
    };
    finish(power_iteration(n, apply, tol, max_iters, rng))
}

fn half_inverse(d: &[f64]) -> Vec<f64> {
    d.iter()
        .map(|&di| if di > 0.0 { 1.0 / di.sqrt() } else { 0.0 })
        .collect()
}

fn rescale(v: &mut Array1<f64>, scale: &[f64]) {
    for (value, &s) in v.iter_mut().zip(scale) {
        *value *= s;
    }
}

fn finish(estimate: Option<(f64, usize)>) -> (f64, usize) {
    match estimate {
        Some(result) => result,
        None => {
            warn!("condition estimate did not produce a finite eigenvalue");
            (0.0, 0)
        }
    }
}

/// Power iteration with a Rayleigh-quotient estimate. `None` on a
/// non-finite or vanishing iterate.
fn power_iteration<R, F>(
    n: usize,
    mut apply: F,
    tol: f64,
    max_iters: usize,
    rng: &mut R,
) -> Option<(f64, usize)>
where
    R: Rng,
    F: FnMut(&Array1<f64>) -> Array1<f64>,
{
    let mut x: Array1<f64> = Array1::from_shape_fn(n, |_| rng.gen_range(-1.0..1.0));
    let norm: f64 = x.dot(&x).sqrt();
    if norm == 0.0 {
        return None;
    }
    x /= norm;

    let mut lambda_prev = 0.0;
    for iteration in 1..=max_iters {
        let y = apply(&x);
        let lambda: f64 = x.dot(&y);
        let norm = y.dot(&y).sqrt();
        if !lambda.is_finite() || !norm.is_finite() {
            return None;
        }
        if norm == 0.0 {
            return Some((0.0, iteration));
        }
        x = y / norm;
        if (lambda - lambda_prev).abs() <= tol * lambda.abs().max(f64::MIN_POSITIVE) {
            return Some((lambda.abs(), iteration));
        }
        lambda_prev = lambda;
    }
    Some((lambda_prev.abs(), max_iters))
}
