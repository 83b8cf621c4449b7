use log::{debug, warn};
use ndarray::Array1;
use petgraph_sparse::Laplacian;
use std::time::{Duration, Instant};

/// How a PCG run ended. Non-convergence is reported, never raised: the
/// best iterate so far is returned alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcgStatus {
    Converged { iterations: usize },
    IterationLimit { iterations: usize },
    TimeLimit { iterations: usize },
}

impl PcgStatus {
    pub fn iterations(&self) -> usize {
        match *self {
            PcgStatus::Converged { iterations }
            | PcgStatus::IterationLimit { iterations }
            | PcgStatus::TimeLimit { iterations } => iterations,
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, PcgStatus::Converged { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PcgOptions {
    /// Relative residual target `||Lx - b|| <= tol * ||b||`.
    pub tol: f64,
    pub max_iters: usize,
    pub max_time: Option<Duration>,
    pub verbose: bool,
}

impl Default for PcgOptions {
    fn default() -> Self {
        PcgOptions {
            tol: 1e-6,
            max_iters: 1000,
            max_time: None,
            verbose: false,
        }
    }
}

/// Preconditioned conjugate gradients on the graph Laplacian.
///
/// `precond` applies an approximate inverse of `L`; for Laplacian
/// right-hand sides it must return zero-mean vectors so the iteration
/// stays orthogonal to the null space.
pub fn pcg<P>(
    laplacian: &Laplacian,
    b: &Array1<f64>,
    mut precond: P,
    options: &PcgOptions,
) -> (Array1<f64>, PcgStatus)
where
    P: FnMut(&Array1<f64>) -> Array1<f64>,
{
    let n = laplacian.node_count();
    let b_norm = b.dot(b).sqrt();
    let mut x = Array1::zeros(n);
    if b_norm == 0.0 {
        return (x, PcgStatus::Converged { iterations: 0 });
    }
    let deadline = options.max_time.map(|budget| Instant::now() + budget);

    let mut r = b.clone();
    let mut q = Array1::zeros(n);
    let mut z = precond(&r);
    let mut p = z.clone();
    let mut rz = r.dot(&z);

    for iteration in 1..=options.max_iters {
        laplacian.multiply(&p, &mut q);
        let pq = p.dot(&q);
        if pq <= 0.0 || !pq.is_finite() {
            warn!("pcg: search direction broke down at iteration {}", iteration);
            return (
                x,
                PcgStatus::IterationLimit {
                    iterations: iteration - 1,
                },
            );
        }
        let alpha = rz / pq;
        for i in 0..n {
            x[i] += alpha * p[i];
            r[i] -= alpha * q[i];
        }

        let r_norm = r.dot(&r).sqrt();
        if options.verbose {
            debug!(
                "pcg: iteration {} relative residual {:e}",
                iteration,
                r_norm / b_norm
            );
        }
        if r_norm <= options.tol * b_norm {
            return (
                x,
                PcgStatus::Converged {
                    iterations: iteration,
                },
            );
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                warn!(
                    "pcg: time budget exhausted after {} iterations, relative residual {:e}",
                    iteration,
                    r_norm / b_norm
                );
                return (
                    x,
                    PcgStatus::TimeLimit {
                        iterations: iteration,
                    },
                );
            }
        }

        z = precond(&r);
        let rz_next = r.dot(&z);
        let beta = rz_next / rz;
        for i in 0..n {
            p[i] = z[i] + beta * p[i];
        }
        rz = rz_next;
    }

    warn!(
        "pcg: did not reach tolerance {:e} in {} iterations",
        options.tol, options.max_iters
    );
    (
        x,
        PcgStatus::IterationLimit {
            iterations: options.max_iters,
        },
    )
}
