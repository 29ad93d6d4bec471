/// Quasi-random low-discrepancy sequence generator producing points in the unit hypercube,
/// based on the generalised Golden Ratio sequences described at
/// <http://extremelearning.com.au/unreasonable-effectiveness-of-quasirandom-sequences/>.
///
/// The sequence is fully determined by the dimension and the seed, so consumers that need
/// reproducible point sets (such as the NSGA-III reference directions) get the same points on
/// every run.
#[derive(Clone, Debug)]
pub struct QuasiRandom {
    dim: usize,
    alpha: Vec<f64>,
    point: Vec<f64>,
}

impl QuasiRandom {
    /// Construct the generator in `dim` dimensions.
    ///
    /// # Arguments
    ///
    /// * `dim`: The dimension of the generated points. Must be at least 1.
    /// * `seed`: The starting coordinate used for every dimension.
    ///
    /// returns: `QuasiRandom`
    pub fn new(dim: usize, seed: f64) -> Self {
        debug_assert!(dim > 0);
        debug_assert!(seed >= 0.0);

        let phi = Self::phi(dim);
        let alpha = (0..dim).map(|i| 1.0 / phi.powi(i as i32 + 1)).collect();
        Self {
            dim,
            alpha,
            point: vec![seed; dim],
        }
    }

    /// Generate the next point of the sequence.
    ///
    /// return: `Vec<f64>`
    pub fn next_point(&mut self) -> Vec<f64> {
        for (p, a) in self.point.iter_mut().zip(&self.alpha) {
            *p += a;
            *p -= p.floor();
        }
        self.point.clone()
    }

    /// The generator's number of dimensions.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Approximate the generalised golden ratio in `dim` dimensions, i.e. the unique positive
    /// root of `x^(dim + 1) = x + 1`, by fixed-point iteration.
    fn phi(dim: usize) -> f64 {
        let exponent = 1.0 / (dim as f64 + 1.0);
        let mut phi = 1.0_f64;
        for _ in 0..30 {
            phi = (1.0 + phi).powf(exponent);
        }
        phi
    }
}
