use crate::core::FitnessMatrix;

/// A read-only view of the engine state passed to the algorithm hooks, the stop conditions, the
/// metrics and the end-of-generation callback.
#[derive(Debug)]
pub struct GaInfo<'a> {
    /// The current generation counter. Generation 0 is the initial population.
    pub generation: usize,
    /// The hard upper bound on the number of generations.
    pub max_generations: usize,
    /// The population size used in the run.
    pub population_size: usize,
    /// The number of objectives of the problem being solved.
    pub num_objectives: usize,
    /// The number of fitness function invocations performed so far.
    pub num_fitness_evals: u64,
    /// The fitness matrix of the current population.
    pub fitness_matrix: &'a FitnessMatrix,
}
