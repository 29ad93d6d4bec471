//! # evoxide
//!
//! A general-purpose evolutionary-computation engine. The crate provides a generation-driven
//! search loop that evolves a population of candidate solutions under user-supplied fitness,
//! variation, selection and replacement policies, supporting single-objective and
//! many-objective (Pareto) optimisation with optional constraint handling.
//!
//! Fitness is always **maximised**; minimisation problems are encoded by negating the objective
//! values.
//!
//! The library modules are:
//! - [`core`]: the candidate, population, encoding and problem primitives.
//! - [`operators`]: the interchangeable selection, replacement, crossover and mutation
//!   operators.
//! - [`algorithms`]: the [`algorithms::GeneticAlgorithm`] engine, the single-objective
//!   composition and the NSGA2 and NSGA3 multi-objective algorithms, with the stop conditions.
//! - [`metrics`]: per-generation metrics such as the fitness statistics and the exact
//!   hypervolume.
//! - [`utils`]: the math kernel with the tolerant float comparisons, the Pareto utilities, the
//!   reference-direction generators and the hypervolume calculation.
//!
//! ## Example
//! ```
//! use evoxide::algorithms::GeneticAlgorithmBuilder;
//! use evoxide::core::builtin_problems::SinX;
//! use evoxide::operators::{PolynomialMutation, SimulatedBinaryCrossover};
//!
//! fn main() -> Result<(), evoxide::core::Error> {
//!     let mut ga = GeneticAlgorithmBuilder::new(
//!         SinX::create()?,
//!         SimulatedBinaryCrossover::default(),
//!         PolynomialMutation::default(),
//!     )
//!     .with_population_size(50)
//!     .with_max_generations(100)
//!     .with_seed(42)
//!     .build()?;
//!
//!     ga.solve()?;
//!     let best = &ga.solutions()[0];
//!     println!("sin(x) is maximal at x = {}", best.chromosome[0]);
//!     Ok(())
//! }
//! ```

pub mod algorithms;
pub mod core;
pub mod metrics;
pub mod operators;
pub mod utils;

use crate::core::Error;

/// Set the size of the process-wide thread pool used for the parallel phases of the engine
/// (candidate evaluation, hypervolume dispatch and Pareto-set merging). The pool is created on
/// first use, so this must be called before the first run; later calls return an error.
///
/// # Arguments
///
/// * `num_threads`: The number of worker threads. Must be positive.
///
/// returns: `Result<(), Error>`
pub fn set_execution_threads(num_threads: usize) -> Result<(), Error> {
    if num_threads == 0 {
        return Err(Error::NoThreads);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| Error::Generic(format!("cannot configure the thread pool: {e}")))
}
