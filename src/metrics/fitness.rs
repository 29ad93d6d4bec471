use std::any::Any;

use crate::core::{FitnessVector, GaInfo};
use crate::metrics::Metric;

macro_rules! fitness_vector_metric {
    ($(#[$doc:meta])* $name:ident, $stat:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            data: Vec<FitnessVector>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// The recorded vector of the given generation.
            pub fn value_at(&self, generation: usize) -> &[f64] {
                &self.data[generation]
            }

            /// The recorded vectors of all generations so far.
            pub fn data(&self) -> &[FitnessVector] {
                &self.data
            }
        }

        impl Metric for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn initialize(&mut self, ga: &GaInfo) {
                self.data.clear();
                self.data.reserve(ga.max_generations + 1);
            }

            fn update(&mut self, ga: &GaInfo) {
                self.data.push(ga.fitness_matrix.$stat());
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

fitness_vector_metric!(
    /// Record the minimum of the fitness values in the population for each objective.
    FitnessMin,
    min_fitness
);
fitness_vector_metric!(
    /// Record the maximum of the fitness values in the population for each objective.
    FitnessMax,
    max_fitness
);
fitness_vector_metric!(
    /// Record the mean of the fitness values in the population for each objective.
    FitnessMean,
    mean_fitness
);
fitness_vector_metric!(
    /// Record the standard deviation of the fitness values in the population for each
    /// objective.
    FitnessStdDev,
    std_dev_fitness
);
fitness_vector_metric!(
    /// Record the population nadir point, the worst fitness value of each objective, for every
    /// generation.
    NadirPoint,
    min_fitness
);

/// Record the number of fitness-function evaluations performed in each generation.
#[derive(Debug, Default)]
pub struct FitnessEvaluations {
    data: Vec<u64>,
    total: u64,
}

impl FitnessEvaluations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of evaluations performed in the given generation.
    pub fn value_at(&self, generation: usize) -> u64 {
        self.data[generation]
    }

    /// The per-generation evaluation counts of all generations so far.
    pub fn data(&self) -> &[u64] {
        &self.data
    }
}

impl Metric for FitnessEvaluations {
    fn name(&self) -> &'static str {
        "FitnessEvaluations"
    }

    fn initialize(&mut self, ga: &GaInfo) {
        self.data.clear();
        self.data.reserve(ga.max_generations + 1);
        self.total = 0;
    }

    fn update(&mut self, ga: &GaInfo) {
        let previous = std::mem::replace(&mut self.total, ga.num_fitness_evals);
        self.data.push(self.total - previous);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::core::{FitnessMatrix, GaInfo};
    use crate::metrics::{FitnessEvaluations, FitnessMean, Metric};

    fn ga_info<'a>(fmat: &'a FitnessMatrix, num_fitness_evals: u64) -> GaInfo<'a> {
        GaInfo {
            generation: 0,
            max_generations: 10,
            population_size: fmat.nrows(),
            num_objectives: fmat.ncols(),
            num_fitness_evals,
            fitness_matrix: fmat,
        }
    }

    #[test]
    fn test_fitness_mean() {
        let mut metric = FitnessMean::new();
        let fmat = FitnessMatrix::from_rows([&[1.0, 4.0][..], &[3.0, 8.0]]);
        let ga = ga_info(&fmat, 0);

        metric.initialize(&ga);
        metric.update(&ga);
        metric.update(&ga);

        assert_eq!(metric.data().len(), 2);
        assert_approx_eq!(f64, metric.value_at(0)[0], 2.0, epsilon = 1e-12);
        assert_approx_eq!(f64, metric.value_at(0)[1], 6.0, epsilon = 1e-12);

        // initialising again clears the recorded data
        metric.initialize(&ga);
        assert!(metric.data().is_empty());
    }

    #[test]
    /// The evaluation metric records per-generation deltas of the running counter.
    fn test_fitness_evaluations() {
        let mut metric = FitnessEvaluations::new();
        let fmat = FitnessMatrix::from_rows([&[1.0][..]]);

        metric.initialize(&ga_info(&fmat, 0));
        metric.update(&ga_info(&fmat, 100));
        metric.update(&ga_info(&fmat, 150));

        assert_eq!(metric.data(), &[100, 50]);
    }
}
