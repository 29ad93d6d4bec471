use crate::core::Encoding;

/// The fitness of a candidate, with one value for each objective. All objectives are maximised;
/// minimisation problems are encoded by negating the objective values.
pub type FitnessVector = Vec<f64>;

/// A candidate solution in the population. A candidate owns its chromosome, the fitness vector
/// calculated for it (empty until the candidate is evaluated), and the constraint violation
/// vector for constrained problems (empty when the problem is unconstrained).
#[derive(Clone, Debug)]
pub struct Candidate<E: Encoding> {
    /// The encoded solution.
    pub chromosome: E::Chromosome,
    /// The fitness values, one for each objective.
    fitness: FitnessVector,
    /// The non-negative violation magnitude of each constraint.
    constraint_violations: Vec<f64>,
    /// Whether the fitness vector is valid for the current chromosome.
    evaluated: bool,
}

impl<E: Encoding> Candidate<E> {
    /// Create a new, unevaluated candidate from a chromosome.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The candidate solution.
    ///
    /// returns: `Candidate<E>`
    pub fn new(chromosome: E::Chromosome) -> Self {
        Self {
            chromosome,
            fitness: Vec::new(),
            constraint_violations: Vec::new(),
            evaluated: false,
        }
    }

    /// Get the fitness vector. This is empty until the candidate is evaluated.
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Get the constraint violation vector. This is empty for unconstrained problems.
    pub fn constraint_violations(&self) -> &[f64] {
        &self.constraint_violations
    }

    /// A candidate has constraint violation when any violation magnitude is strictly positive.
    ///
    /// return: `bool`
    pub fn has_constraint_violation(&self) -> bool {
        self.constraint_violations.iter().any(|v| *v > 0.0)
    }

    /// Whether the fitness vector is valid for the current chromosome.
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Store the evaluation results and mark the candidate as evaluated.
    ///
    /// # Arguments
    ///
    /// * `fitness`: The fitness vector.
    /// * `constraint_violations`: The constraint violation magnitudes.
    pub fn set_evaluation(&mut self, fitness: FitnessVector, constraint_violations: Vec<f64>) {
        self.fitness = fitness;
        self.constraint_violations = constraint_violations;
        self.evaluated = true;
    }

    /// Mark the fitness vector as stale. Called after the chromosome changed through mutation or
    /// repair.
    pub fn invalidate(&mut self) {
        self.evaluated = false;
    }

    /// Replace the chromosome and mark the candidate as unevaluated.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The new chromosome.
    pub fn replace_chromosome(&mut self, chromosome: E::Chromosome) {
        self.chromosome = chromosome;
        self.invalidate();
    }

    /// Compare two candidates. Candidates are equal when their chromosomes are equal under the
    /// encoding's comparison (the tolerant float comparison for real-coded chromosomes).
    ///
    /// # Arguments
    ///
    /// * `encoding`: The encoding of both candidates.
    /// * `other`: The other candidate.
    ///
    /// returns: `bool`
    pub fn same_chromosome(&self, encoding: &E, other: &Self) -> bool {
        encoding.chromosomes_equal(&self.chromosome, &other.chromosome)
    }
}

#[cfg(test)]
mod test {
    use crate::core::{BinaryEncoding, Candidate, RealEncoding};
    use crate::core::{Bounds, BoundsSpec, Encoding};

    #[test]
    fn test_candidate_lifecycle() {
        let mut candidate: Candidate<BinaryEncoding> = Candidate::new(vec![true, false]);
        assert!(!candidate.is_evaluated());
        assert!(candidate.fitness().is_empty());

        candidate.set_evaluation(vec![1.0], vec![]);
        assert!(candidate.is_evaluated());
        assert!(!candidate.has_constraint_violation());

        candidate.invalidate();
        assert!(!candidate.is_evaluated());
    }

    #[test]
    fn test_constraint_violation() {
        let mut candidate: Candidate<BinaryEncoding> = Candidate::new(vec![true]);
        candidate.set_evaluation(vec![0.0], vec![0.0, 0.0]);
        assert!(!candidate.has_constraint_violation());

        candidate.set_evaluation(vec![0.0], vec![0.0, 0.3]);
        assert!(candidate.has_constraint_violation());
    }

    #[test]
    /// Real-coded candidates compare with the tolerant float comparison.
    fn test_same_chromosome() {
        let encoding =
            RealEncoding::new(2, BoundsSpec::Uniform(Bounds::new(0.0, 1.0).unwrap())).unwrap();
        let a: Candidate<RealEncoding> = Candidate::new(vec![0.5, 0.5]);
        let b: Candidate<RealEncoding> = Candidate::new(vec![0.5, 0.5 + f64::EPSILON]);
        let c: Candidate<RealEncoding> = Candidate::new(vec![0.5, 0.9]);

        assert!(a.same_chromosome(&encoding, &b));
        assert!(!a.same_chromosome(&encoding, &c));
        assert!(encoding.is_valid(&a.chromosome));
    }
}
