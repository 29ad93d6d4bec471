use thiserror::Error;

#[derive(Error, Debug)]
/// Errors raised by the library.
pub enum Error {
    #[error("The following error occurred: {0}")]
    Generic(String),
    #[error("The population size must be a positive number")]
    EmptyPopulation,
    #[error("The maximum number of generations must be a positive number")]
    NoGenerations,
    #[error("The {0} rate ({1}) must be in the closed interval [0, 1]")]
    InvalidRate(String, f64),
    #[error("The lower bound ({0}) must not be larger than the upper bound ({1})")]
    InvalidBounds(String, String),
    #[error("A bound must be provided for each of the {0} genes, but {1} bounds were given")]
    MismatchedBounds(usize, usize),
    #[error("The chromosome length must be a positive number")]
    EmptyChromosome,
    #[error("The number of execution threads must be a positive number")]
    NoThreads,
    #[error("An error occurred in the selection operator '{0}': {1}")]
    SelectionOperator(String, String),
    #[error("An error occurred in the crossover operator '{0}': {1}")]
    CrossoverOperator(String, String),
    #[error("An error occurred in the mutation operator '{0}': {1}")]
    MutationOperator(String, String),
    #[error("An error occurred when evaluating a candidate: {0}")]
    Evaluation(String),
    #[error("An error occurred in the calculation of the '{0}' metric: {1}")]
    Metric(String, String),
    #[error("An error occurred when initialising {0}: {1}")]
    AlgorithmInit(String, String),
    #[error("An error occurred when running {0}: {1}")]
    AlgorithmRun(String, String),
    #[error("The {0} algorithm cannot solve a problem with {1} objectives")]
    WrongAlgorithm(String, usize),
}
