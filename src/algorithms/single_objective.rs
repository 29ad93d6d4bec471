use rand::RngCore;

use crate::algorithms::Algorithm;
use crate::core::{Error, FitnessMatrix, GaInfo};
use crate::operators::{Replacement, Selection};

/// The single-objective evolutionary algorithm: the composition of one parent-selection and one
/// population-replacement operator. The algorithm only works on problems with exactly one
/// objective and fails at [`Algorithm::initialize`] otherwise.
///
/// See [`crate::operators::selection`] for the selection catalogue (roulette, tournament, rank,
/// sigma scaling, Boltzmann) and [`crate::operators::replacement`] for the replacement
/// catalogue (keep-children, elitism, keep-best).
#[derive(Debug)]
pub struct SingleObjective<S: Selection, R: Replacement> {
    selection: S,
    replacement: R,
}

impl<S: Selection, R: Replacement> SingleObjective<S, R> {
    /// Create the algorithm from a selection and a replacement operator.
    ///
    /// # Arguments
    ///
    /// * `selection`: The parent-selection operator.
    /// * `replacement`: The population-replacement operator.
    ///
    /// returns: `SingleObjective<S, R>`
    pub fn new(selection: S, replacement: R) -> Self {
        Self {
            selection,
            replacement,
        }
    }
}

impl<S: Selection, R: Replacement> Algorithm for SingleObjective<S, R> {
    fn name(&self) -> &'static str {
        "SingleObjective"
    }

    fn initialize(&mut self, ga: &GaInfo) -> Result<(), Error> {
        if ga.num_objectives != 1 {
            return Err(Error::WrongAlgorithm(
                self.name().to_string(),
                ga.num_objectives,
            ));
        }
        self.selection.initialize(ga)
    }

    fn prepare(&mut self, ga: &GaInfo) -> Result<(), Error> {
        self.selection.prepare(ga, ga.fitness_matrix);
        Ok(())
    }

    fn select(&self, ga: &GaInfo, rng: &mut dyn RngCore) -> usize {
        self.selection.select(ga, ga.fitness_matrix, rng)
    }

    fn next_population(
        &mut self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        parents_end: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, Error> {
        let _ = rng;
        let indices = self
            .replacement
            .next_population(ga, combined, parents_end);

        debug_assert_eq!(indices.len(), ga.population_size);
        debug_assert!(indices.iter().all(|i| *i < combined.nrows()));
        Ok(indices)
    }
}


#[cfg(test)]
mod test_problems {
    use float_cmp::assert_approx_eq;

    use crate::algorithms::{GeneticAlgorithmBuilder, SingleObjective};
    use crate::core::builtin_problems::{ConstrainedSphere, SinX, StringMatch, Tsp};
    use crate::operators::{
        EdgeCrossover, InversionMutation, KeepBest, PolynomialMutation,
        SimulatedBinaryCrossover, Tournament, TwoPointCrossover, UniformIntegerMutation,
    };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    /// Maximise sin(x) on [0, pi]. The best candidate converges to x = pi / 2 with a fitness
    /// of 1.
    fn test_sin_x() {
        init_logger();
        let mut ga = GeneticAlgorithmBuilder::new(
            SinX::create().unwrap(),
            SimulatedBinaryCrossover::default(),
            PolynomialMutation::default(),
        )
        .with_population_size(100)
        .with_max_generations(500)
        .with_seed(10)
        .build()
        .unwrap();
        ga.solve().unwrap();

        let best = &ga.solutions()[0];
        assert_approx_eq!(
            f64,
            best.chromosome[0],
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-3
        );
        assert_approx_eq!(f64, best.fitness()[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    /// The constrained maximum of x^2 + y^2 on [-1, 1]^2 with x > 0 and y > 0. The sign-flip
    /// repair keeps the population feasible and the best solution approaches (1, 1).
    fn test_constrained_sphere() {
        init_logger();
        let mut ga = GeneticAlgorithmBuilder::new(
            ConstrainedSphere::create().unwrap(),
            SimulatedBinaryCrossover::default(),
            PolynomialMutation::default(),
        )
        .with_population_size(100)
        .with_max_generations(500)
        .with_seed(3)
        .build()
        .unwrap();
        ga.solve().unwrap();

        let best = &ga.solutions()[0];
        assert!(!best.has_constraint_violation());
        for gene in &best.chromosome {
            assert!(
                (0.99..=1.0).contains(gene),
                "expected the solution near (1, 1), got {:?}",
                best.chromosome
            );
        }
    }

    #[test]
    /// The berlin52 travelling salesman instance with an edge-recombination crossover and
    /// inversion mutation. The best tour gets within about 1.5% of the 7542 optimum.
    fn test_tsp_berlin52() {
        init_logger();
        let problem = Tsp::create().unwrap();
        let mut ga = GeneticAlgorithmBuilder::new(
            problem,
            EdgeCrossover,
            InversionMutation,
        )
        .with_algorithm(SingleObjective::new(Tournament::default(), KeepBest))
        .with_population_size(500)
        .with_max_generations(1250)
        .with_crossover_rate(0.9)
        .with_mutation_rate(0.05)
        .with_seed(12)
        .build()
        .unwrap();
        ga.solve().unwrap();

        let best_length = -ga.solutions()[0].fitness()[0];
        assert!(
            best_length <= 7650.0,
            "expected a tour below 7650, got {best_length}"
        );
    }

    #[test]
    /// Match the string "HELLO WORLD!" with an integer-encoded population.
    fn test_string_match() {
        init_logger();
        let target = "HELLO WORLD!";
        let mut ga = GeneticAlgorithmBuilder::new(
            StringMatch::create(target).unwrap(),
            TwoPointCrossover,
            UniformIntegerMutation,
        )
        .with_algorithm(SingleObjective::new(Tournament::default(), KeepBest))
        .with_population_size(100)
        .with_max_generations(500)
        .with_mutation_rate(0.01)
        .with_seed(6)
        .build()
        .unwrap();
        ga.solve().unwrap();

        let best = &ga.solutions()[0];
        assert_eq!(best.fitness()[0], target.len() as f64);
        assert_eq!(StringMatch::decode(&best.chromosome), target);
    }
}
