use std::sync::atomic::{AtomicU64, Ordering as MemOrdering};

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::algorithms::{Algorithm, DefaultAlgorithm, StoppingConditionType};
use crate::core::{
    Candidate, Encoding, Error, FitnessFunction, FitnessMatrix, GaInfo, Population, Problem,
};
use crate::metrics::{Metric, MetricSet};
use crate::operators::{Crossover, Mutation};
use crate::utils::pareto_set_merge;

/// The end-of-generation callback type.
pub type GenerationCallback = dyn FnMut(&GaInfo);

/// Get the random number generator used by the engine. The generator is re-created from the
/// seed at the start of every run, so two runs with the same seed and configuration produce
/// bit-identical populations.
///
/// # Arguments
///
/// * `seed`: The optional seed number. A random seed is picked when `None`.
///
/// returns: `ChaCha8Rng`
fn get_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        None => ChaCha8Rng::from_entropy(),
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
    }
}

/// Evaluate one candidate. Candidates that are already evaluated are skipped unless the fitness
/// function is dynamic. The evaluation counter is incremented once per actual fitness-function
/// invocation.
///
/// # Arguments
///
/// * `problem`: The problem being solved.
/// * `num_objectives`: The expected fitness vector length, or 0 when it is not known yet.
/// * `num_fitness_evals`: The shared evaluation counter.
/// * `candidate`: The candidate to evaluate.
///
/// returns: `Result<(), Error>`
fn evaluate_candidate<E: Encoding, F: FitnessFunction<E>>(
    problem: &Problem<E, F>,
    num_objectives: usize,
    num_fitness_evals: &AtomicU64,
    candidate: &mut Candidate<E>,
) -> Result<(), Error> {
    if candidate.is_evaluated() && !problem.fitness_function.is_dynamic() {
        return Ok(());
    }

    let fitness = problem.fitness_function.evaluate(&candidate.chromosome);
    num_fitness_evals.fetch_add(1, MemOrdering::Relaxed);

    if fitness.is_empty() {
        return Err(Error::Evaluation(
            "the fitness function returned an empty fitness vector".to_string(),
        ));
    }
    if num_objectives != 0 && fitness.len() != num_objectives {
        return Err(Error::Evaluation(format!(
            "the fitness function returned {} values for a problem with {} objectives",
            fitness.len(),
            num_objectives
        )));
    }
    debug_assert!(fitness.iter().all(|f| !f.is_nan()));

    let constraint_violations = match &problem.constraints {
        Some(constraints) => {
            let violations = constraints(&candidate.chromosome);
            debug_assert!(violations.iter().all(|v| *v >= 0.0));
            violations
        }
        None => Vec::new(),
    };

    candidate.set_evaluation(fitness, constraint_violations);
    Ok(())
}

/// The genetic algorithm engine: the generational loop composing population initialisation,
/// parent selection, variation (crossover, mutation and optional repair), evaluation,
/// replacement and termination. The engine owns the population, the fitness matrix, the metric
/// set and the generation counter; the evolutionary policy itself is delegated to the
/// [`Algorithm`] and the variation operators, so any combination of encoding, operators,
/// algorithm and stop condition can be composed through [`GeneticAlgorithmBuilder`].
///
/// # Example
/// ```
/// use evoxide::algorithms::GeneticAlgorithmBuilder;
/// use evoxide::core::{Bounds, BoundsSpec, Problem, RealEncoding};
/// use evoxide::operators::{PolynomialMutation, SimulatedBinaryCrossover};
///
/// fn main() -> Result<(), evoxide::core::Error> {
///     let encoding = RealEncoding::new(1, BoundsSpec::Uniform(Bounds::new(0.0, 3.14)?))?;
///     let problem = Problem::new(encoding, |x: &Vec<f64>| vec![x[0].sin()]);
///
///     let mut ga = GeneticAlgorithmBuilder::new(
///         problem,
///         SimulatedBinaryCrossover::default(),
///         PolynomialMutation::default(),
///     )
///     .with_population_size(20)
///     .with_max_generations(50)
///     .with_seed(1)
///     .build()?;
///
///     ga.solve()?;
///     println!("best candidate: {:?}", ga.solutions()[0].chromosome);
///     Ok(())
/// }
/// ```
pub struct GeneticAlgorithm<E, F, A, C, M>
where
    E: Encoding,
    F: FitnessFunction<E>,
    A: Algorithm,
    C: Crossover<E>,
    M: Mutation<E>,
{
    problem: Problem<E, F>,
    algorithm: A,
    crossover: C,
    mutation: M,
    stopping_condition: Option<StoppingConditionType>,
    metrics: MetricSet,
    end_of_generation: Option<Box<GenerationCallback>>,
    initial_population: Vec<E::Chromosome>,
    population_size: usize,
    max_generations: usize,
    crossover_rate: f64,
    mutation_rate: f64,
    archive_all_optima: bool,
    seed: Option<u64>,
    // run state, re-created by every `solve` call
    population: Population<E>,
    fitness_matrix: FitnessMatrix,
    solutions: Vec<Candidate<E>>,
    num_objectives: usize,
    generation: usize,
    num_fitness_evals: AtomicU64,
    rng: ChaCha8Rng,
}

impl<E, F, A, C, M> GeneticAlgorithm<E, F, A, C, M>
where
    E: Encoding,
    F: FitnessFunction<E>,
    A: Algorithm,
    C: Crossover<E>,
    M: Mutation<E>,
{
    /// The evolved population. Empty until [`GeneticAlgorithm::solve`] is called.
    pub fn population(&self) -> &Population<E> {
        &self.population
    }

    /// The optimal candidates found by the run. With `archive_all_optima` enabled this holds
    /// every Pareto-optimal candidate ever seen, otherwise the optimal candidates of the final
    /// population.
    pub fn solutions(&self) -> &[Candidate<E>] {
        &self.solutions
    }

    /// The generation counter reached by the last run.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The number of objectives of the problem, known after the first evaluation.
    pub fn num_objectives(&self) -> usize {
        self.num_objectives
    }

    /// The number of fitness-function invocations performed by the last run.
    pub fn num_fitness_evals(&self) -> u64 {
        self.num_fitness_evals.load(MemOrdering::Relaxed)
    }

    /// The fitness matrix of the evolved population.
    pub fn fitness_matrix(&self) -> &FitnessMatrix {
        &self.fitness_matrix
    }

    /// The tracked metrics with the data recorded by the last run.
    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Run the evolution until the stop condition is met or the generation counter reaches the
    /// configured maximum. Calling `solve` again restarts the evolution from a fresh population
    /// with the configured seed.
    ///
    /// returns: `Result<(), Error>`
    pub fn solve(&mut self) -> Result<(), Error> {
        info!("starting {}", self.algorithm.name());
        self.generation = 0;
        self.num_fitness_evals = AtomicU64::new(0);
        self.solutions.clear();
        self.rng = get_rng(self.seed);

        // the number of objectives is only known after evaluating one candidate
        let mut probe = Candidate::new(self.problem.encoding.generate(&mut self.rng));
        evaluate_candidate(&self.problem, 0, &self.num_fitness_evals, &mut probe)?;
        self.num_objectives = probe.fitness().len();
        debug!("the problem has {} objectives", self.num_objectives);

        // initial population: the supplied chromosomes first, generated candidates for the rest
        let mut candidates: Vec<Candidate<E>> = Vec::with_capacity(self.population_size);
        for chromosome in self.initial_population.iter().take(self.population_size) {
            if !self.problem.encoding.is_valid(chromosome) {
                return Err(Error::AlgorithmInit(
                    self.algorithm.name().to_string(),
                    "an initial chromosome does not match the encoding size or bounds"
                        .to_string(),
                ));
            }
            candidates.push(Candidate::new(chromosome.clone()));
        }
        while candidates.len() < self.population_size {
            candidates.push(Candidate::new(self.problem.encoding.generate(&mut self.rng)));
        }
        self.population = Population::new_with(candidates);

        info!("evaluating initial population");
        Self::parallel_evaluation(
            &self.problem,
            self.num_objectives,
            &self.num_fitness_evals,
            self.population.candidates_mut(),
        )?;
        self.fitness_matrix = FitnessMatrix::from_population(&self.population);

        let ga = GaInfo {
            generation: self.generation,
            max_generations: self.max_generations,
            population_size: self.population_size,
            num_objectives: self.num_objectives,
            num_fitness_evals: self.num_fitness_evals.load(MemOrdering::Relaxed),
            fitness_matrix: &self.fitness_matrix,
        };
        self.algorithm.initialize(&ga)?;
        if let Some(condition) = &mut self.stopping_condition {
            condition.initialize();
        }
        self.metrics.initialize(&ga);
        // record generation 0
        self.metrics.update(&ga);
        if self.archive_all_optima {
            self.archive_optima();
        }

        loop {
            if self.generation >= self.max_generations {
                info!("stopping evolution, the maximum number of generations was reached");
                break;
            }
            let ga = GaInfo {
                generation: self.generation,
                max_generations: self.max_generations,
                population_size: self.population_size,
                num_objectives: self.num_objectives,
                num_fitness_evals: self.num_fitness_evals.load(MemOrdering::Relaxed),
                fitness_matrix: &self.fitness_matrix,
            };
            if let Some(condition) = &mut self.stopping_condition {
                if condition.is_met(&ga) {
                    info!("stopping evolution, the {} was reached", condition.name());
                    break;
                }
            }
            self.evolve()?;
        }

        if !self.archive_all_optima {
            self.solutions = self
                .algorithm
                .optimal_indices(&self.fitness_matrix)
                .into_iter()
                .map(|i| self.population.candidates()[i].clone())
                .collect();
        }

        info!(
            "finished after {} generations and {} fitness evaluations with {} solutions",
            self.generation,
            self.num_fitness_evals(),
            self.solutions.len()
        );
        Ok(())
    }

    /// Evolve the population by one generation: selection, crossover, mutation, optional
    /// repair, evaluation, replacement and the metric update.
    fn evolve(&mut self) -> Result<(), Error> {
        debug!("evolving generation #{}", self.generation + 1);
        let ga = GaInfo {
            generation: self.generation,
            max_generations: self.max_generations,
            population_size: self.population_size,
            num_objectives: self.num_objectives,
            num_fitness_evals: self.num_fitness_evals.load(MemOrdering::Relaxed),
            fitness_matrix: &self.fitness_matrix,
        };
        self.algorithm.prepare(&ga)?;

        // selection + crossover, two children at a time
        let num_pairs = self.population_size.div_ceil(2);
        let mut children: Vec<Candidate<E>> = Vec::with_capacity(num_pairs * 2);
        for _ in 0..num_pairs {
            let first = self.algorithm.select(&ga, &mut self.rng);
            let second = self.algorithm.select(&ga, &mut self.rng);
            let parent1 = &self.population.candidates()[first];
            let parent2 = &self.population.candidates()[second];

            let (chromosome1, chromosome2) = self.crossover.crossover(
                &self.problem.encoding,
                &parent1.chromosome,
                &parent2.chromosome,
                self.crossover_rate,
                &mut self.rng,
            );
            // children keep the parent evaluation while their chromosome is unchanged
            children.push(Self::make_child(parent1, chromosome1));
            children.push(Self::make_child(parent2, chromosome2));
        }
        children.truncate(self.population_size);

        if !self.crossover.allows_variable_length() {
            debug_assert!(
                children
                    .iter()
                    .all(|c| self.problem.encoding.is_valid(&c.chromosome)),
                "the crossover produced an invalid chromosome"
            );
        }

        // mutation and repair run on the calling thread, the evaluation in parallel
        for child in children.iter_mut() {
            let changed = self.mutation.mutate(
                &self.problem.encoding,
                &mut child.chromosome,
                self.mutation_rate,
                &mut self.rng,
            );
            if changed {
                child.invalidate();
            }
            if let Some(repair) = &self.problem.repair {
                if let Some(fixed) = repair(child) {
                    debug_assert!(
                        self.problem.encoding.is_valid(&fixed),
                        "the repair function produced an invalid chromosome"
                    );
                    child.replace_chromosome(fixed);
                }
            }
        }
        Self::parallel_evaluation(
            &self.problem,
            self.num_objectives,
            &self.num_fitness_evals,
            &mut children,
        )?;

        // replacement over the combined parent and child populations
        let parents_end = self.population.len();
        let mut combined = self.fitness_matrix.clone();
        for child in &children {
            combined.append_row(child.fitness());
        }
        let next = self
            .algorithm
            .next_population(&ga, &combined, parents_end, &mut self.rng)?;
        if next.len() != self.population_size {
            return Err(Error::AlgorithmRun(
                self.algorithm.name().to_string(),
                format!(
                    "the algorithm returned {} survivors for a population of {}",
                    next.len(),
                    self.population_size
                ),
            ));
        }

        let mut new_population = Population::new();
        for index in next {
            let candidate = if index < parents_end {
                self.population.candidates()[index].clone()
            } else {
                children[index - parents_end].clone()
            };
            new_population.add_candidate(candidate);
        }
        self.population = new_population;
        self.fitness_matrix = FitnessMatrix::from_population(&self.population);

        if self.archive_all_optima {
            self.archive_optima();
        }

        let ga = GaInfo {
            generation: self.generation,
            max_generations: self.max_generations,
            population_size: self.population_size,
            num_objectives: self.num_objectives,
            num_fitness_evals: self.num_fitness_evals.load(MemOrdering::Relaxed),
            fitness_matrix: &self.fitness_matrix,
        };
        self.metrics.update(&ga);
        if let Some(callback) = &mut self.end_of_generation {
            callback(&ga);
        }
        self.generation += 1;
        Ok(())
    }

    /// Create a child candidate from a crossover result. A child whose chromosome matches its
    /// parent keeps the parent evaluation, so skipped crossovers do not trigger re-evaluations
    /// of static fitness functions.
    fn make_child(parent: &Candidate<E>, chromosome: E::Chromosome) -> Candidate<E> {
        if parent.chromosome == chromosome {
            parent.clone()
        } else {
            Candidate::new(chromosome)
        }
    }

    /// Evaluate the unevaluated candidates on the thread pool. Every candidate is written into
    /// its own slot, so the results are deterministic regardless of the pool size. Evaluation
    /// errors are propagated to the caller after the parallel phase.
    fn parallel_evaluation(
        problem: &Problem<E, F>,
        num_objectives: usize,
        num_fitness_evals: &AtomicU64,
        candidates: &mut [Candidate<E>],
    ) -> Result<(), Error> {
        candidates.par_iter_mut().try_for_each(|candidate| {
            evaluate_candidate(problem, num_objectives, num_fitness_evals, candidate)
        })
    }

    /// Merge the optimal candidates of the current population into the solutions archive,
    /// dropping dominated and duplicate entries.
    fn archive_optima(&mut self) {
        let new_optima: Vec<Candidate<E>> = self
            .algorithm
            .optimal_indices(&self.fitness_matrix)
            .into_iter()
            .map(|i| self.population.candidates()[i].clone())
            .collect();

        let left: Vec<&[f64]> = self.solutions.iter().map(|c| c.fitness()).collect();
        let right: Vec<&[f64]> = new_optima.iter().map(|c| c.fitness()).collect();
        let (keep_left, keep_right) = pareto_set_merge(&left, &right);

        let mut merged: Vec<Candidate<E>> = keep_left
            .into_iter()
            .map(|i| self.solutions[i].clone())
            .collect();
        for index in keep_right {
            let candidate = &new_optima[index];
            let duplicate = merged
                .iter()
                .any(|kept| kept.same_chromosome(&self.problem.encoding, candidate));
            if !duplicate {
                merged.push(candidate.clone());
            }
        }
        self.solutions = merged;
    }
}

/// The builder assembling a [`GeneticAlgorithm`] from a problem, the variation operators, an
/// optional algorithm and the run configuration. The configuration is validated by
/// [`GeneticAlgorithmBuilder::build`]; the population size is the only setting without a
/// default.
pub struct GeneticAlgorithmBuilder<E, F, A = DefaultAlgorithm, C = (), M = ()>
where
    E: Encoding,
    F: FitnessFunction<E>,
{
    problem: Problem<E, F>,
    algorithm: A,
    crossover: C,
    mutation: M,
    stopping_condition: Option<StoppingConditionType>,
    metrics: MetricSet,
    end_of_generation: Option<Box<GenerationCallback>>,
    initial_population: Vec<E::Chromosome>,
    population_size: Option<usize>,
    max_generations: usize,
    crossover_rate: f64,
    mutation_rate: f64,
    archive_all_optima: bool,
    seed: Option<u64>,
}

impl<E, F, C, M> GeneticAlgorithmBuilder<E, F, DefaultAlgorithm, C, M>
where
    E: Encoding,
    F: FitnessFunction<E>,
    C: Crossover<E>,
    M: Mutation<E>,
{
    /// Create a builder for a problem and its variation operators. Without an explicit
    /// algorithm, a default is picked once the number of objectives is known: tournament
    /// selection with keep-best replacement for single-objective problems and NSGA3 for
    /// multi-objective ones.
    ///
    /// # Arguments
    ///
    /// * `problem`: The problem to solve.
    /// * `crossover`: The crossover operator.
    /// * `mutation`: The mutation operator.
    ///
    /// returns: `GeneticAlgorithmBuilder<E, F, DefaultAlgorithm, C, M>`
    pub fn new(problem: Problem<E, F>, crossover: C, mutation: M) -> Self {
        Self {
            problem,
            algorithm: DefaultAlgorithm::default(),
            crossover,
            mutation,
            stopping_condition: None,
            metrics: MetricSet::new(),
            end_of_generation: None,
            initial_population: Vec::new(),
            population_size: None,
            max_generations: 500,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            archive_all_optima: false,
            seed: None,
        }
    }
}

impl<E, F, A, C, M> GeneticAlgorithmBuilder<E, F, A, C, M>
where
    E: Encoding,
    F: FitnessFunction<E>,
    A: Algorithm,
    C: Crossover<E>,
    M: Mutation<E>,
{
    /// Replace the default algorithm with an explicit one.
    pub fn with_algorithm<A2: Algorithm>(
        self,
        algorithm: A2,
    ) -> GeneticAlgorithmBuilder<E, F, A2, C, M> {
        GeneticAlgorithmBuilder {
            problem: self.problem,
            algorithm,
            crossover: self.crossover,
            mutation: self.mutation,
            stopping_condition: self.stopping_condition,
            metrics: self.metrics,
            end_of_generation: self.end_of_generation,
            initial_population: self.initial_population,
            population_size: self.population_size,
            max_generations: self.max_generations,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            archive_all_optima: self.archive_all_optima,
            seed: self.seed,
        }
    }

    /// Set the population size. This is fixed for the duration of a run and has no default.
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = Some(population_size);
        self
    }

    /// Set the hard upper bound on the number of generations. Defaults to 500.
    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    /// Set the crossover rate. Defaults to 0.9.
    pub fn with_crossover_rate(mut self, crossover_rate: f64) -> Self {
        self.crossover_rate = crossover_rate;
        self
    }

    /// Set the mutation rate. Defaults to 0.1.
    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    /// Set the seed of the random number generator. Runs with the same seed and configuration
    /// are reproducible; a random seed is picked when none is set.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the early-stop condition, polled between generations.
    pub fn with_stopping_condition(mut self, condition: StoppingConditionType) -> Self {
        self.stopping_condition = Some(condition);
        self
    }

    /// Keep every Pareto-optimal candidate seen during the run instead of only the optimal
    /// candidates of the final population.
    pub fn with_archive_all_optima(mut self, archive: bool) -> Self {
        self.archive_all_optima = archive;
        self
    }

    /// Seed the initial population with known chromosomes. At most `population_size` of them
    /// are used; the remaining slots are filled with generated candidates.
    pub fn with_initial_population(mut self, chromosomes: Vec<E::Chromosome>) -> Self {
        self.initial_population = chromosomes;
        self
    }

    /// Track a metric during the run.
    pub fn with_metric(mut self, metric: Box<dyn Metric>) -> Self {
        self.metrics.add(metric);
        self
    }

    /// Set a callback invoked after the metric update of every generation.
    pub fn with_end_of_generation(
        mut self,
        callback: impl FnMut(&GaInfo) + 'static,
    ) -> Self {
        self.end_of_generation = Some(Box::new(callback));
        self
    }

    /// Validate the configuration and build the engine.
    ///
    /// returns: `Result<GeneticAlgorithm<E, F, A, C, M>, Error>`
    pub fn build(self) -> Result<GeneticAlgorithm<E, F, A, C, M>, Error> {
        let population_size = match self.population_size {
            Some(size) if size > 0 => size,
            _ => return Err(Error::EmptyPopulation),
        };
        if self.max_generations == 0 {
            return Err(Error::NoGenerations);
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(Error::InvalidRate("crossover".to_string(), self.crossover_rate));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidRate("mutation".to_string(), self.mutation_rate));
        }

        Ok(GeneticAlgorithm {
            problem: self.problem,
            algorithm: self.algorithm,
            crossover: self.crossover,
            mutation: self.mutation,
            stopping_condition: self.stopping_condition,
            metrics: self.metrics,
            end_of_generation: self.end_of_generation,
            initial_population: self.initial_population,
            population_size,
            max_generations: self.max_generations,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            archive_all_optima: self.archive_all_optima,
            seed: self.seed,
            population: Population::new(),
            fitness_matrix: FitnessMatrix::empty(0),
            solutions: Vec::new(),
            num_objectives: 0,
            generation: 0,
            num_fitness_evals: AtomicU64::new(0),
            rng: get_rng(self.seed),
        })
    }
}
