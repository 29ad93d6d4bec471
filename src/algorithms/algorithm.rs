use rand::RngCore;

use crate::algorithms::{Nsga3, SingleObjective};
use crate::core::{Error, FitnessMatrix, GaInfo};
use crate::operators::{KeepBest, Tournament};
use crate::utils::pareto_front;

/// The trait to implement an evolutionary algorithm: the policy deciding which candidates
/// reproduce and which survive. The generational loop owns the population and drives the
/// algorithm exclusively through these hooks:
///
/// 1. [`Algorithm::initialize`] once at the start of a run, after the initial population has
///    been evaluated. Algorithm/objective mismatches are reported here, before any generation
///    runs.
/// 2. [`Algorithm::prepare`] once per generation, before the parent selections.
/// 3. [`Algorithm::select`] for every parent pick.
/// 4. [`Algorithm::next_population`] once per generation to choose the survivors among the
///    combined parents and children.
pub trait Algorithm: Send {
    /// The algorithm name used in log and error messages.
    fn name(&self) -> &'static str;

    /// Initialise the algorithm state from the evaluated initial population. This returns an
    /// error when the algorithm cannot solve a problem with the number of objectives reported
    /// by `ga`.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state, with the fitness matrix of the initial population.
    ///
    /// returns: `Result<(), Error>`
    fn initialize(&mut self, ga: &GaInfo) -> Result<(), Error>;

    /// Called once per generation before the parent selections.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    ///
    /// returns: `Result<(), Error>`
    fn prepare(&mut self, ga: &GaInfo) -> Result<(), Error> {
        let _ = ga;
        Ok(())
    }

    /// Select the index of one parent from the current population.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    /// * `rng`: The random number generator.
    ///
    /// returns: `usize`
    fn select(&self, ga: &GaInfo, rng: &mut dyn RngCore) -> usize;

    /// Choose the candidates surviving into the next generation from the combined parent and
    /// child populations. The returned vector holds exactly `ga.population_size` distinct
    /// indices into `combined`.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    /// * `combined`: The fitness matrix of the parents followed by the children.
    /// * `parents_end`: The number of parent rows at the start of `combined`.
    /// * `rng`: The random number generator.
    ///
    /// returns: `Result<Vec<usize>, Error>`
    fn next_population(
        &mut self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        parents_end: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, Error>;

    /// The indices of the optimal candidates of the current population. The default returns the
    /// Pareto front of the fitness matrix; rank-based algorithms return their rank-0 set.
    ///
    /// # Arguments
    ///
    /// * `fmat`: The fitness matrix of the current population.
    ///
    /// returns: `Vec<usize>`
    fn optimal_indices(&self, fmat: &FitnessMatrix) -> Vec<usize> {
        pareto_front(fmat)
    }
}

/// The algorithm used when the user does not pick one. The number of objectives is only known
/// after the first candidate has been evaluated, so the concrete algorithm is resolved at
/// [`Algorithm::initialize`]: a single-objective problem gets a tournament selection with
/// keep-best replacement, a multi-objective problem gets NSGA-III.
#[derive(Default)]
pub enum DefaultAlgorithm {
    /// The algorithm has not been resolved yet.
    #[default]
    Unresolved,
    /// The single-objective default.
    SingleObjective(SingleObjective<Tournament, KeepBest>),
    /// The multi-objective default.
    Nsga3(Box<Nsga3>),
}

impl DefaultAlgorithm {
    fn resolved(&self) -> &dyn Algorithm {
        match self {
            DefaultAlgorithm::Unresolved => {
                unreachable!("the default algorithm is resolved at initialize")
            }
            DefaultAlgorithm::SingleObjective(algorithm) => algorithm,
            DefaultAlgorithm::Nsga3(algorithm) => algorithm.as_ref(),
        }
    }

    fn resolved_mut(&mut self) -> &mut dyn Algorithm {
        match self {
            DefaultAlgorithm::Unresolved => {
                unreachable!("the default algorithm is resolved at initialize")
            }
            DefaultAlgorithm::SingleObjective(algorithm) => algorithm,
            DefaultAlgorithm::Nsga3(algorithm) => algorithm.as_mut(),
        }
    }
}

impl Algorithm for DefaultAlgorithm {
    fn name(&self) -> &'static str {
        match self {
            DefaultAlgorithm::Unresolved => "DefaultAlgorithm",
            DefaultAlgorithm::SingleObjective(algorithm) => algorithm.name(),
            DefaultAlgorithm::Nsga3(algorithm) => algorithm.name(),
        }
    }

    fn initialize(&mut self, ga: &GaInfo) -> Result<(), Error> {
        if matches!(self, DefaultAlgorithm::Unresolved) {
            *self = if ga.num_objectives == 1 {
                DefaultAlgorithm::SingleObjective(SingleObjective::new(
                    Tournament::default(),
                    KeepBest,
                ))
            } else {
                DefaultAlgorithm::Nsga3(Box::new(Nsga3::new()))
            };
        }
        self.resolved_mut().initialize(ga)
    }

    fn prepare(&mut self, ga: &GaInfo) -> Result<(), Error> {
        self.resolved_mut().prepare(ga)
    }

    fn select(&self, ga: &GaInfo, rng: &mut dyn RngCore) -> usize {
        self.resolved().select(ga, rng)
    }

    fn next_population(
        &mut self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        parents_end: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, Error> {
        self.resolved_mut().next_population(ga, combined, parents_end, rng)
    }

    fn optimal_indices(&self, fmat: &FitnessMatrix) -> Vec<usize> {
        self.resolved().optimal_indices(fmat)
    }
}
