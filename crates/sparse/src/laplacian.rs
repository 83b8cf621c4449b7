use crate::CsGraph;
use ndarray::Array1;

/// Graph Laplacian `L = D - A` as an operator over a borrowed [`CsGraph`].
///
/// The weighted degrees are cached at construction so that `multiply`
/// touches each stored entry exactly once.
#[derive(Debug)]
pub struct Laplacian<'a> {
    graph: &'a CsGraph,
    degrees: Vec<f64>,
}

impl<'a> Laplacian<'a> {
    pub fn new(graph: &'a CsGraph) -> Laplacian<'a> {
        let degrees = (0..graph.node_count())
            .map(|v| graph.weighted_degree(v))
            .collect();
        Laplacian { graph, degrees }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Weighted degree diagonal of `L`.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Computes `y = Lx`.
    ///
    /// For each vertex i: `(Lx)_i = d_i x_i - sum of w_ij x_j` over the
    /// neighbors j of i.
    pub fn multiply(&self, x: &Array1<f64>, y: &mut Array1<f64>) {
        for i in 0..self.node_count() {
            y[i] = self.degrees[i] * x[i];
        }
        for i in 0..self.node_count() {
            for (j, w) in self.graph.neighbors(i) {
                y[i] -= w * x[j];
            }
        }
    }

    /// Computes `x^T L x` as the sum of `w_ij (x_i - x_j)^2` over edges.
    pub fn quadratic_form(&self, x: &Array1<f64>) -> f64 {
        let mut result = 0.0;
        for (i, j, w) in self.graph.edges() {
            let diff = x[i] - x[j];
            result += w * diff * diff;
        }
        result
    }

    /// The residual `b - Lx`, reusing the caller's output vector.
    pub fn residual(&self, x: &Array1<f64>, b: &Array1<f64>, r: &mut Array1<f64>) {
        self.multiply(x, r);
        for i in 0..self.node_count() {
            r[i] = b[i] - r[i];
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    fn triangle() -> CsGraph {
        CsGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 2.0), (0, 2, 3.0)])
    }

    #[test]
    fn test_multiply_annihilates_constants() {
        let graph = triangle();
        let laplacian = Laplacian::new(&graph);
        let ones = Array1::ones(3);
        let mut y = Array1::zeros(3);
        laplacian.multiply(&ones, &mut y);
        for value in y.iter() {
            assert!(value.abs() < 1e-12);
        }
    }

    #[test]
    fn test_multiply_is_symmetric() {
        let graph = triangle();
        let laplacian = Laplacian::new(&graph);
        let x = array![1.0, -2.0, 0.5];
        let z = array![0.25, 3.0, -1.0];
        let mut lx = Array1::zeros(3);
        let mut lz = Array1::zeros(3);
        laplacian.multiply(&x, &mut lx);
        laplacian.multiply(&z, &mut lz);
        assert!((lx.dot(&z) - lz.dot(&x)).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_form_matches_multiply() {
        let graph = triangle();
        let laplacian = Laplacian::new(&graph);
        let x = array![1.0, 0.0, -1.0];
        let mut lx = Array1::zeros(3);
        laplacian.multiply(&x, &mut lx);
        assert!((laplacian.quadratic_form(&x) - x.dot(&lx)).abs() < 1e-12);
    }
}
