use crate::EdgeFactor;
use ndarray::Array1;

/// Forward sweep through the descriptor in elimination order.
///
/// For each stored column, every split entry passes `fval * y[i]` down
/// to its row and damps `y[i]` by `1 - fval`; the final unit entry takes
/// whatever is left.
pub fn forward_sweep(factor: &EdgeFactor, y: &mut Array1<f64>) {
    for (ii, &i) in factor.col.iter().enumerate() {
        let (j0, j1) = (factor.colptr[ii], factor.colptr[ii + 1] - 1);
        let mut yi = y[i];
        for jj in j0..j1 {
            y[factor.rowval[jj]] += factor.fval[jj] * yi;
            yi *= 1.0 - factor.fval[jj];
        }
        y[factor.rowval[j1]] += yi;
        y[i] = yi;
    }
}

/// Backward sweep: the exact reverse of [`forward_sweep`], walking the
/// columns and their entries last to first.
pub fn backward_sweep(factor: &EdgeFactor, y: &mut Array1<f64>) {
    for (ii, &i) in factor.col.iter().enumerate().rev() {
        let (j0, j1) = (factor.colptr[ii], factor.colptr[ii + 1] - 1);
        let mut yi = y[i] + y[factor.rowval[j1]];
        for jj in (j0..j1).rev() {
            yi = (1.0 - factor.fval[jj]) * yi + factor.fval[jj] * y[factor.rowval[jj]];
        }
        y[i] = yi;
    }
}
