use std::fmt::Debug;

use crate::core::{Candidate, Encoding, FitnessVector};

/// The trait to implement the fitness function of a problem. Given a chromosome, the function
/// returns one fitness value per objective. All objectives are **maximised**; to minimise an
/// objective, return its negated value.
///
/// The number of objectives is not declared up front. The engine determines it by evaluating one
/// generated candidate at the start of a run and every later evaluation must return a vector of
/// the same length.
pub trait FitnessFunction<E: Encoding>: Send + Sync {
    /// Calculate the fitness vector of a chromosome.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The chromosome to evaluate.
    ///
    /// returns: `FitnessVector`
    fn evaluate(&self, chromosome: &E::Chromosome) -> FitnessVector;

    /// Whether the fitness function is dynamic. The fitness of a chromosome evaluated by a
    /// static function never changes, so candidates whose chromosome did not change are not
    /// re-evaluated. Dynamic functions are re-evaluated every generation.
    ///
    /// return: `bool`
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Whether chromosomes of a different length than the one generated by the encoding are
    /// allowed. Only relevant with variable-chromosome-length crossover operators.
    ///
    /// return: `bool`
    fn allows_variable_length(&self) -> bool {
        false
    }
}

/// Any closure returning a fitness vector can be used as a static fitness function.
impl<E, F> FitnessFunction<E> for F
where
    E: Encoding,
    F: Fn(&E::Chromosome) -> FitnessVector + Send + Sync,
{
    fn evaluate(&self, chromosome: &E::Chromosome) -> FitnessVector {
        self(chromosome)
    }
}

/// The optional constraint function of a problem. Given a chromosome, this returns one
/// non-negative violation magnitude per constraint; a value of zero means the constraint is
/// satisfied.
pub type ConstraintsFn<E> =
    dyn Fn(&<E as Encoding>::Chromosome) -> Vec<f64> + Send + Sync;

/// The optional repair function of a problem. The function may inspect the whole candidate,
/// including its fitness and constraint state, and return a fixed chromosome. Returning `None`
/// leaves the candidate untouched, and its `is_evaluated` flag keeps its previous value.
pub type RepairFn<E> =
    dyn Fn(&Candidate<E>) -> Option<<E as Encoding>::Chromosome> + Send + Sync;

/// A problem definition: the encoding, the fitness function and the optional constraint and
/// repair functions.
pub struct Problem<E: Encoding, F: FitnessFunction<E>> {
    /// The gene encoding.
    pub encoding: E,
    /// The fitness function.
    pub fitness_function: F,
    /// The optional constraint function.
    pub constraints: Option<Box<ConstraintsFn<E>>>,
    /// The optional repair function.
    pub repair: Option<Box<RepairFn<E>>>,
}

impl<E: Encoding, F: FitnessFunction<E>> Debug for Problem<E, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("encoding", &self.encoding)
            .field("constrained", &self.constraints.is_some())
            .field("repaired", &self.repair.is_some())
            .finish()
    }
}

impl<E: Encoding, F: FitnessFunction<E>> Problem<E, F> {
    /// Create an unconstrained problem.
    ///
    /// # Arguments
    ///
    /// * `encoding`: The gene encoding.
    /// * `fitness_function`: The fitness function.
    ///
    /// returns: `Problem<E, F>`
    pub fn new(encoding: E, fitness_function: F) -> Self {
        Self {
            encoding,
            fitness_function,
            constraints: None,
            repair: None,
        }
    }

    /// Set the constraint function.
    ///
    /// # Arguments
    ///
    /// * `constraints`: The function returning the violation magnitude of each constraint.
    ///
    /// returns: `Self`
    pub fn with_constraints(
        mut self,
        constraints: impl Fn(&E::Chromosome) -> Vec<f64> + Send + Sync + 'static,
    ) -> Self {
        self.constraints = Some(Box::new(constraints));
        self
    }

    /// Set the repair function applied to every child after mutation.
    ///
    /// # Arguments
    ///
    /// * `repair`: The function returning the fixed chromosome, or `None` when the candidate
    ///    needs no repair.
    ///
    /// returns: `Self`
    pub fn with_repair(
        mut self,
        repair: impl Fn(&Candidate<E>) -> Option<E::Chromosome> + Send + Sync + 'static,
    ) -> Self {
        self.repair = Some(Box::new(repair));
        self
    }
}
