use rand::{Rng, RngCore};

use crate::core::{Error, FitnessMatrix, GaInfo};
use crate::utils::{argsort, mean, std_dev, vector_max, vector_min, Sort};

/// The trait to implement a parent-selection strategy for the single-objective algorithm.
///
/// The engine calls [`Selection::initialize`] once at the start of a run,
/// [`Selection::prepare`] once per generation before the selections, and then
/// [`Selection::select`] `N` (or `N + 1`) times per generation to pick the parent indices, where
/// `N` is the population size. `select` takes `&self` so implementations stay reentrant.
pub trait Selection: Send + Sync {
    /// Called once at the start of a run.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    ///
    /// returns: `Result<(), Error>`
    fn initialize(&mut self, ga: &GaInfo) -> Result<(), Error> {
        let _ = ga;
        Ok(())
    }

    /// Called once per generation before any selection. Implementations typically turn the
    /// fitness matrix into selection weights here.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    /// * `fmat`: The fitness matrix of the current population.
    fn prepare(&mut self, ga: &GaInfo, fmat: &FitnessMatrix);

    /// Select the index of one parent from the current population.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    /// * `fmat`: The fitness matrix of the current population.
    /// * `rng`: The random number generator.
    ///
    /// returns: `usize`
    fn select(&self, ga: &GaInfo, fmat: &FitnessMatrix, rng: &mut dyn RngCore) -> usize;
}

/// Turn non-negative selection weights into a cumulative distribution function.
fn weights_to_cdf(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let mut cdf = Vec::with_capacity(weights.len());
    let mut acc = 0.0;
    for weight in weights {
        acc += weight / total;
        cdf.push(acc);
    }
    cdf
}

/// Sample an index from a cumulative distribution function.
fn sample_cdf(cdf: &[f64], rng: &mut dyn RngCore) -> usize {
    debug_assert!(!cdf.is_empty());
    let value = rng.gen::<f64>();
    cdf.partition_point(|p| *p <= value).min(cdf.len() - 1)
}

/// Fitness-proportionate selection. The selection probability of a candidate is proportional to
/// its fitness, shifted so that the worst candidate still has a positive probability when
/// negative fitness values are present.
#[derive(Debug, Default)]
pub struct Roulette {
    cdf: Vec<f64>,
}

impl Roulette {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Selection for Roulette {
    fn prepare(&mut self, _ga: &GaInfo, fmat: &FitnessMatrix) {
        let fvec = fmat.column(0);

        // roulette selection would not work with negative fitness values. Shift by twice the
        // minimum so the worst candidate keeps a positive selection probability
        let offset = f64::min(2.0 * vector_min(&fvec), 0.0);
        let weights: Vec<f64> = fvec.iter().map(|f| f - offset).collect();
        self.cdf = weights_to_cdf(&weights);
    }

    fn select(&self, _ga: &GaInfo, _fmat: &FitnessMatrix, rng: &mut dyn RngCore) -> usize {
        sample_cdf(&self.cdf, rng)
    }
}

/// Tournament selection. `size` candidates are picked uniformly with replacement and the one
/// with the highest fitness becomes a parent.
#[derive(Debug)]
pub struct Tournament {
    size: usize,
}

impl Tournament {
    /// Create a tournament selection operator. This returns an error if the tournament size is
    /// smaller than 2.
    ///
    /// # Arguments
    ///
    /// * `size`: The number of candidates competing in each tournament.
    ///
    /// returns: `Result<Tournament, Error>`
    pub fn new(size: usize) -> Result<Self, Error> {
        if size < 2 {
            return Err(Error::SelectionOperator(
                "Tournament".to_string(),
                "the tournament size must be at least 2".to_string(),
            ));
        }
        Ok(Self { size })
    }
}

impl Default for Tournament {
    /// A binary tournament.
    fn default() -> Self {
        Self { size: 2 }
    }
}

impl Selection for Tournament {
    fn prepare(&mut self, _ga: &GaInfo, _fmat: &FitnessMatrix) {}

    fn select(&self, _ga: &GaInfo, fmat: &FitnessMatrix, rng: &mut dyn RngCore) -> usize {
        let mut best = rng.gen_range(0..fmat.nrows());
        for _ in 1..self.size {
            let challenger = rng.gen_range(0..fmat.nrows());
            if fmat.row(challenger)[0] > fmat.row(best)[0] {
                best = challenger;
            }
        }
        best
    }
}

/// Rank selection. The selection probability is linear in the fitness rank of the candidate,
/// interpolated between the configured weight of the worst and of the best candidate.
#[derive(Debug)]
pub struct Rank {
    min_weight: f64,
    max_weight: f64,
    cdf: Vec<f64>,
}

impl Rank {
    /// Create a rank selection operator. This returns an error unless
    /// `0 <= min_weight <= max_weight`.
    ///
    /// # Arguments
    ///
    /// * `min_weight`: The selection weight assigned to the worst candidate.
    /// * `max_weight`: The selection weight assigned to the best candidate.
    ///
    /// returns: `Result<Rank, Error>`
    pub fn new(min_weight: f64, max_weight: f64) -> Result<Self, Error> {
        if !(0.0 <= min_weight && min_weight <= max_weight) {
            return Err(Error::SelectionOperator(
                "Rank".to_string(),
                format!(
                    "the weights must satisfy 0 <= min ({}) <= max ({})",
                    min_weight, max_weight
                ),
            ));
        }
        Ok(Self {
            min_weight,
            max_weight,
            cdf: Vec::new(),
        })
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self {
            min_weight: 0.1,
            max_weight: 1.1,
            cdf: Vec::new(),
        }
    }
}

impl Selection for Rank {
    fn prepare(&mut self, _ga: &GaInfo, fmat: &FitnessMatrix) {
        let fvec = fmat.column(0);
        let indices = argsort(&fvec, Sort::Ascending);

        let mut weights = vec![0.0; fvec.len()];
        for (rank, idx) in indices.iter().enumerate() {
            let t = if weights.len() > 1 {
                rank as f64 / (weights.len() - 1) as f64
            } else {
                1.0
            };
            weights[*idx] = self.min_weight + t * (self.max_weight - self.min_weight);
        }
        self.cdf = weights_to_cdf(&weights);
    }

    fn select(&self, _ga: &GaInfo, _fmat: &FitnessMatrix, rng: &mut dyn RngCore) -> usize {
        sample_cdf(&self.cdf, rng)
    }
}

/// Sigma-scaled selection. The selection weight of a candidate with fitness `f` is
/// `max(0, 1 + (f - mean) / (scale * stdev))`, making the selection pressure independent of the
/// spread of the population fitness.
#[derive(Debug)]
pub struct SigmaScaling {
    scale: f64,
    cdf: Vec<f64>,
}

impl SigmaScaling {
    /// Create a sigma-scaling selection operator. This returns an error if the scale is smaller
    /// than 1.
    ///
    /// # Arguments
    ///
    /// * `scale`: The scaling of the standard deviation in the weight denominator.
    ///
    /// returns: `Result<SigmaScaling, Error>`
    pub fn new(scale: f64) -> Result<Self, Error> {
        if !(1.0..=f64::MAX).contains(&scale) {
            return Err(Error::SelectionOperator(
                "SigmaScaling".to_string(),
                format!("the scale ({}) must be in the closed interval [1, f64::MAX]", scale),
            ));
        }
        Ok(Self {
            scale,
            cdf: Vec::new(),
        })
    }
}

impl Default for SigmaScaling {
    fn default() -> Self {
        Self {
            scale: 3.0,
            cdf: Vec::new(),
        }
    }
}

impl Selection for SigmaScaling {
    fn prepare(&mut self, _ga: &GaInfo, fmat: &FitnessMatrix) {
        let fvec = fmat.column(0);
        let fmean = mean(&fvec);
        let fdev = f64::max(std_dev(&fvec, fmean), 1e-6);

        let weights: Vec<f64> = fvec
            .iter()
            .map(|f| f64::max(1.0 + (f - fmean) / (self.scale * fdev), 0.0))
            .collect();
        self.cdf = weights_to_cdf(&weights);
    }

    fn select(&self, _ga: &GaInfo, _fmat: &FitnessMatrix, rng: &mut dyn RngCore) -> usize {
        sample_cdf(&self.cdf, rng)
    }
}

/// The temperature schedule of the [`Boltzmann`] selection, called with the current generation
/// and the maximum number of generations.
pub type TemperatureFn = fn(usize, usize) -> f64;

/// Boltzmann selection. The selection weight of a candidate is `exp(f_norm / T)`, where `f_norm`
/// is its fitness normalised into `[0, 1]` over the population and `T` the current temperature.
/// The default schedule is a smooth sigmoid between about 4.25 and about 0.25: the temperature
/// is high in the early generations, keeping the selection pressure low, and decreases as the
/// run progresses.
#[derive(Debug)]
pub struct Boltzmann {
    temperature: TemperatureFn,
    cdf: Vec<f64>,
}

impl Boltzmann {
    /// Create a Boltzmann selection operator with a custom temperature schedule.
    ///
    /// # Arguments
    ///
    /// * `temperature`: The temperature function of the generation counter and the maximum
    ///   generation count.
    ///
    /// returns: `Boltzmann`
    pub fn new(temperature: TemperatureFn) -> Self {
        Self {
            temperature,
            cdf: Vec::new(),
        }
    }

    /// The default temperature schedule, a smooth sigmoid over the progress of the run.
    pub fn default_temperature(generation: usize, max_generations: usize) -> f64 {
        let t = generation as f64 / max_generations as f64;
        -4.0 / (1.0 + f64::exp(-10.0 * t + 3.0)) + 4.0 + 0.25
    }
}

impl Default for Boltzmann {
    fn default() -> Self {
        Self::new(Self::default_temperature)
    }
}

impl Selection for Boltzmann {
    fn prepare(&mut self, ga: &GaInfo, fmat: &FitnessMatrix) {
        let fvec = fmat.column(0);
        let fmin = vector_min(&fvec);
        let df = f64::max(vector_max(&fvec) - fmin, 1e-6);
        let temperature = (self.temperature)(ga.generation, ga.max_generations);

        let weights: Vec<f64> = fvec
            .iter()
            .map(|f| f64::exp((f - fmin) / df / temperature))
            .collect();
        self.cdf = weights_to_cdf(&weights);
    }

    fn select(&self, _ga: &GaInfo, _fmat: &FitnessMatrix, rng: &mut dyn RngCore) -> usize {
        sample_cdf(&self.cdf, rng)
    }
}
