use rand::Rng;

/// Walker alias table for O(1) draws from a discrete distribution with
/// positive weights.
///
/// Construction is O(k): the weights are normalized to sum `k`, then a
/// two-pointer sweep pairs each deficient ("small") bucket with a
/// surplus ("big") one. A draw picks a bucket uniformly and returns it
/// with the stored probability, its alias otherwise.
#[derive(Debug, Clone)]
pub struct AliasTable {
    frac: Vec<f64>,
    alias: Vec<usize>,
    residual: f64,
}

impl AliasTable {
    pub fn new(weights: &[f64]) -> AliasTable {
        let k = weights.len();
        if k == 0 {
            panic!("alias table over an empty distribution");
        }
        let total: f64 = weights.iter().sum();
        debug_assert!(total > 0.0 && weights.iter().all(|&w| w > 0.0));

        let scale = k as f64 / total;
        let mut frac = weights.iter().map(|&w| w * scale).collect::<Vec<_>>();
        let mut alias = (0..k).collect::<Vec<_>>();

        let mut small = Vec::with_capacity(k);
        let mut big = Vec::with_capacity(k);
        for (i, &f) in frac.iter().enumerate() {
            if f < 1.0 {
                small.push(i);
            } else {
                big.push(i);
            }
        }
        while let (Some(&s), Some(&b)) = (small.last(), big.last()) {
            small.pop();
            alias[s] = b;
            frac[b] -= 1.0 - frac[s];
            if frac[b] < 1.0 {
                big.pop();
                small.push(b);
            }
        }
        // Leftovers on either stack are off by rounding only.
        let mut residual = 0.0;
        for &i in small.iter().chain(big.iter()) {
            residual += (frac[i] - 1.0).abs();
            frac[i] = 1.0;
        }
        AliasTable {
            frac,
            alias,
            residual,
        }
    }

    pub fn len(&self) -> usize {
        self.frac.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frac.is_empty()
    }

    /// Total normalization error absorbed while building; bounded by
    /// `k` times the rounding unit.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let i = rng.gen_range(0..self.len());
        if rng.gen::<f64>() < self.frac[i] {
            i
        } else {
            self.alias[i]
        }
    }

    pub fn sample_many<R: Rng>(&self, rng: &mut R, s: usize) -> Vec<usize> {
        (0..s).map(|_| self.sample(rng)).collect()
    }
}
