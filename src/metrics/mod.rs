//! Per-generation metrics. A [`Metric`] is initialised once at the start of a run and updated
//! once at the end of every generation with the fitness matrix of the new population; the
//! recorded data is retained until the next run starts. Metrics are registered on the engine
//! and retrieved by type from the [`MetricSet`] after (or during) a run.

use std::any::Any;

use crate::core::GaInfo;

pub use fitness::{
    FitnessEvaluations, FitnessMax, FitnessMean, FitnessMin, FitnessStdDev, NadirPoint,
};
pub use hypervolume::{AutoHypervolume, Hypervolume};

mod fitness;
mod hypervolume;

/// The trait to implement a per-generation metric.
pub trait Metric: Any + Send {
    /// The metric name used in log and error messages.
    fn name(&self) -> &'static str;

    /// Clear the recorded data at the start of a run.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    fn initialize(&mut self, ga: &GaInfo);

    /// Record the value of the metric for the current generation.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    fn update(&mut self, ga: &GaInfo);

    /// The metric as [`Any`], used for the typed retrieval in [`MetricSet::get`].
    fn as_any(&self) -> &dyn Any;
}

/// The set of metrics tracked by the engine during a run.
#[derive(Default)]
pub struct MetricSet {
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric to the set.
    pub fn add(&mut self, metric: Box<dyn Metric>) {
        self.metrics.push(metric);
    }

    /// The number of tracked metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Get a tracked metric by its type.
    ///
    /// returns: `Option<&M>`. `None` when no metric of the type is tracked.
    pub fn get<M: Metric>(&self) -> Option<&M> {
        self.metrics
            .iter()
            .find_map(|metric| metric.as_any().downcast_ref::<M>())
    }

    /// Initialise every metric at the start of a run.
    pub(crate) fn initialize(&mut self, ga: &GaInfo) {
        for metric in &mut self.metrics {
            metric.initialize(ga);
        }
    }

    /// Update every metric with the state of the current generation.
    pub(crate) fn update(&mut self, ga: &GaInfo) {
        for metric in &mut self.metrics {
            metric.update(ga);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::core::{FitnessMatrix, GaInfo};
    use crate::metrics::{FitnessMax, FitnessMin, MetricSet};

    #[test]
    /// Metrics are retrieved by their type.
    fn test_typed_retrieval() {
        let mut set = MetricSet::new();
        set.add(Box::new(FitnessMax::new()));

        let fmat = FitnessMatrix::from_rows([&[1.0][..], &[3.0]]);
        let ga = GaInfo {
            generation: 0,
            max_generations: 10,
            population_size: 2,
            num_objectives: 1,
            num_fitness_evals: 0,
            fitness_matrix: &fmat,
        };
        set.initialize(&ga);
        set.update(&ga);

        let max = set.get::<FitnessMax>().unwrap();
        assert_eq!(max.value_at(0), &[3.0]);
        assert!(set.get::<FitnessMin>().is_none());
    }
}
