//! # `algorithms` – The engine and the evolutionary policies
//!
//! This module contains the [`GeneticAlgorithm`] engine, the generational loop that owns the
//! population, the fitness matrix, the metric set and the generation counter, and the
//! [`Algorithm`] trait with the concrete evolutionary policies driving it:
//!
//! | Algorithm | Parent selection | Replacement |
//! |-----------|------------------|-------------|
//! | [`SingleObjective`] | One of the [`crate::operators::selection`] strategies | One of the [`crate::operators::replacement`] strategies |
//! | [`Nsga2`] | Binary crowded tournament | Non-dominated fronts split by crowding distance |
//! | [`Nsga3`] | Niched binary tournament | Non-dominated fronts split by reference-direction niching |
//!
//! When no algorithm is configured, [`DefaultAlgorithm`] resolves one after the number of
//! objectives is known: tournament selection with keep-best replacement for single-objective
//! problems, NSGA3 for multi-objective ones.
//!
//! Runs terminate when the configured [`StoppingConditionType`] is met or the generation
//! counter reaches the configured maximum.

pub use algorithm::{Algorithm, DefaultAlgorithm};
pub use engine::{GeneticAlgorithm, GeneticAlgorithmBuilder};
pub use nsga2::Nsga2;
pub use nsga3::Nsga3;
pub use single_objective::SingleObjective;
pub use stopping_condition::{
    FitnessStallValue, MaxFunctionEvaluationValue, StoppingConditionType, TargetFitnessValue,
};

mod algorithm;
mod engine;
mod nsga2;
mod nsga3;
mod single_objective;
mod stopping_condition;
