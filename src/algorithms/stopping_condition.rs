use crate::core::{FitnessVector, GaInfo};
use crate::utils::pareto_compare;

/// Number of fitness-function evaluations after which a run terminates.
#[derive(Clone, Debug)]
pub struct MaxFunctionEvaluationValue(pub u64);

/// A fitness threshold vector. A run terminates when any candidate Pareto-dominates the
/// threshold.
#[derive(Clone, Debug)]
pub struct TargetFitnessValue(pub FitnessVector);

/// The configuration and state of a fitness-stall condition. A run terminates when the tracked
/// per-objective statistic has not improved by at least `delta` for `patience` consecutive
/// generations.
#[derive(Clone, Debug)]
pub struct FitnessStallValue {
    /// The number of consecutive generations without improvement after which the run stops.
    patience: usize,
    /// The minimum improvement of any objective that resets the patience counter.
    delta: f64,
    /// The best value of the tracked statistic seen so far, for each objective.
    best: FitnessVector,
    /// The remaining number of generations without improvement.
    counter: usize,
}

impl FitnessStallValue {
    /// Create the stall condition.
    ///
    /// # Arguments
    ///
    /// * `patience`: The number of consecutive generations without improvement after which the
    ///   run stops.
    /// * `delta`: The minimum improvement of any objective that resets the patience counter.
    ///
    /// returns: `FitnessStallValue`
    pub fn new(patience: usize, delta: f64) -> Self {
        Self {
            patience,
            delta,
            best: Vec::new(),
            counter: patience + 1,
        }
    }

    fn reset(&mut self) {
        self.best.clear();
        self.counter = self.patience + 1;
    }

    /// Track the statistic of the current generation. The best-seen vector is updated for every
    /// objective that improved; any improvement of at least `delta` resets the patience
    /// counter.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    /// * `current`: The per-objective statistic of the current generation.
    ///
    /// returns: `bool`. Whether the run should stop.
    fn is_met(&mut self, ga: &GaInfo, current: FitnessVector) -> bool {
        // the first polled generation only records the starting point
        if ga.generation == 0 {
            self.counter = self.patience + 1;
            self.best = current;
            return false;
        }

        let mut improved = false;
        for (best, new) in self.best.iter_mut().zip(current) {
            if new >= *best + self.delta {
                *best = new;
                improved = true;
                // no break, the entire best-seen vector needs to be updated
            }
        }

        if improved {
            self.counter = self.patience + 1;
        } else {
            self.counter -= 1;
        }
        self.counter == 0
    }
}

/// The type of stopping condition. Pick one type, or combine several with
/// [`StoppingConditionType::Any`] and [`StoppingConditionType::All`], to inform the engine when
/// it should terminate the evolution. The hard bound on the number of generations is always
/// active, independently of the configured condition.
#[derive(Clone, Debug)]
pub enum StoppingConditionType {
    /// Stop when the number of fitness evaluations reaches the maximum.
    MaxFunctionEvaluations(MaxFunctionEvaluationValue),
    /// Stop when any candidate Pareto-dominates the fitness threshold.
    TargetFitness(TargetFitnessValue),
    /// Stop when the per-objective mean fitness of the population stalls.
    FitnessMeanStall(FitnessStallValue),
    /// Stop when the per-objective maximum fitness of the population stalls.
    FitnessBestStall(FitnessStallValue),
    /// Stop when at least one condition is met.
    Any(Vec<StoppingConditionType>),
    /// Stop when all conditions are met.
    All(Vec<StoppingConditionType>),
}

impl StoppingConditionType {
    /// A name describing the stopping condition.
    ///
    /// returns: `String`
    pub fn name(&self) -> String {
        match self {
            StoppingConditionType::MaxFunctionEvaluations(_) => {
                "maximum number of function evaluations".to_string()
            }
            StoppingConditionType::TargetFitness(_) => "target fitness value".to_string(),
            StoppingConditionType::FitnessMeanStall(_) => "mean fitness stall".to_string(),
            StoppingConditionType::FitnessBestStall(_) => "best fitness stall".to_string(),
            StoppingConditionType::Any(conditions) => conditions
                .iter()
                .map(|condition| condition.name())
                .collect::<Vec<String>>()
                .join(" OR "),
            StoppingConditionType::All(conditions) => conditions
                .iter()
                .map(|condition| condition.name())
                .collect::<Vec<String>>()
                .join(" AND "),
        }
    }

    /// Reset the internal state of the condition at the start of a run.
    pub(crate) fn initialize(&mut self) {
        match self {
            StoppingConditionType::FitnessMeanStall(stall)
            | StoppingConditionType::FitnessBestStall(stall) => stall.reset(),
            StoppingConditionType::Any(conditions) | StoppingConditionType::All(conditions) => {
                conditions.iter_mut().for_each(|c| c.initialize())
            }
            _ => {}
        }
    }

    /// Whether the stopping condition is met for the current generation. Composite conditions
    /// short-circuit.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    ///
    /// returns: `bool`
    pub(crate) fn is_met(&mut self, ga: &GaInfo) -> bool {
        match self {
            StoppingConditionType::MaxFunctionEvaluations(max) => ga.num_fitness_evals >= max.0,
            StoppingConditionType::TargetFitness(threshold) => {
                debug_assert_eq!(threshold.0.len(), ga.num_objectives);
                ga.fitness_matrix
                    .rows()
                    .any(|fitness| pareto_compare(&threshold.0, fitness) == -1)
            }
            StoppingConditionType::FitnessMeanStall(stall) => {
                let mean = ga.fitness_matrix.mean_fitness();
                stall.is_met(ga, mean)
            }
            StoppingConditionType::FitnessBestStall(stall) => {
                let best = ga.fitness_matrix.max_fitness();
                stall.is_met(ga, best)
            }
            StoppingConditionType::Any(conditions) => {
                conditions.iter_mut().any(|condition| condition.is_met(ga))
            }
            StoppingConditionType::All(conditions) => {
                conditions.iter_mut().all(|condition| condition.is_met(ga))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::core::{FitnessMatrix, GaInfo};

    use super::*;

    fn ga_info<'a>(
        fmat: &'a FitnessMatrix,
        generation: usize,
        num_fitness_evals: u64,
    ) -> GaInfo<'a> {
        GaInfo {
            generation,
            max_generations: 100,
            population_size: fmat.nrows(),
            num_objectives: fmat.ncols(),
            num_fitness_evals,
            fitness_matrix: fmat,
        }
    }

    #[test]
    fn test_max_function_evaluations() {
        let fmat = FitnessMatrix::from_rows([&[1.0][..]]);
        let mut condition =
            StoppingConditionType::MaxFunctionEvaluations(MaxFunctionEvaluationValue(100));

        assert!(!condition.is_met(&ga_info(&fmat, 1, 99)));
        assert!(condition.is_met(&ga_info(&fmat, 1, 100)));
    }

    #[test]
    /// The target is only reached when a candidate strictly dominates the threshold.
    fn test_target_fitness() {
        let mut condition =
            StoppingConditionType::TargetFitness(TargetFitnessValue(vec![1.0, 1.0]));

        let fmat = FitnessMatrix::from_rows([&[0.5, 2.0][..], &[1.0, 1.0]]);
        assert!(!condition.is_met(&ga_info(&fmat, 1, 0)));

        let fmat = FitnessMatrix::from_rows([&[1.0, 2.0][..]]);
        assert!(condition.is_met(&ga_info(&fmat, 1, 0)));
    }

    #[test]
    /// The stall condition fires after `patience` generations without improvement.
    fn test_best_stall() {
        let mut condition =
            StoppingConditionType::FitnessBestStall(FitnessStallValue::new(2, 0.1));
        let fmat = FitnessMatrix::from_rows([&[1.0][..]]);

        // generation 0 records the starting point
        assert!(!condition.is_met(&ga_info(&fmat, 0, 0)));
        assert!(!condition.is_met(&ga_info(&fmat, 1, 0)));
        assert!(!condition.is_met(&ga_info(&fmat, 2, 0)));
        assert!(condition.is_met(&ga_info(&fmat, 3, 0)));
    }

    #[test]
    /// An improvement of at least delta resets the patience counter.
    fn test_mean_stall_resets_on_improvement() {
        let mut condition =
            StoppingConditionType::FitnessMeanStall(FitnessStallValue::new(1, 0.5));

        let start = FitnessMatrix::from_rows([&[1.0][..]]);
        assert!(!condition.is_met(&ga_info(&start, 0, 0)));

        let improved = FitnessMatrix::from_rows([&[2.0][..]]);
        assert!(!condition.is_met(&ga_info(&improved, 1, 0)));

        // a small improvement below delta does not reset the counter
        let stalled = FitnessMatrix::from_rows([&[2.1][..]]);
        assert!(!condition.is_met(&ga_info(&stalled, 2, 0)));
        assert!(condition.is_met(&ga_info(&stalled, 3, 0)));
    }

    #[test]
    /// Composite conditions combine their members with short-circuit logic.
    fn test_composite_conditions() {
        let fmat = FitnessMatrix::from_rows([&[1.0][..]]);

        let mut any = StoppingConditionType::Any(vec![
            StoppingConditionType::MaxFunctionEvaluations(MaxFunctionEvaluationValue(1000)),
            StoppingConditionType::TargetFitness(TargetFitnessValue(vec![0.5])),
        ]);
        assert!(any.is_met(&ga_info(&fmat, 1, 0)));

        let mut all = StoppingConditionType::All(vec![
            StoppingConditionType::MaxFunctionEvaluations(MaxFunctionEvaluationValue(1000)),
            StoppingConditionType::TargetFitness(TargetFitnessValue(vec![0.5])),
        ]);
        assert!(!all.is_met(&ga_info(&fmat, 1, 0)));
        assert!(all.is_met(&ga_info(&fmat, 1, 1000)));

        assert!(any.name().contains("OR"));
        assert!(all.name().contains("AND"));
    }
}
