use crate::core::{FitnessMatrix, GaInfo};
use crate::utils::{argsort, Sort};

/// The trait to implement a population-replacement strategy for the single-objective algorithm.
/// After the children of a generation have been evaluated, the replacement picks the candidates
/// that survive into the next generation from the combined parent and child populations.
pub trait Replacement: Send + Sync {
    /// Select the candidates of the next population.
    ///
    /// # Arguments
    ///
    /// * `ga`: The view of the engine state.
    /// * `combined`: The fitness matrix of the parents followed by the children.
    /// * `parents_end`: The number of parent rows at the start of `combined`.
    ///
    /// returns: `Vec<usize>`. Exactly `ga.population_size` indices into `combined`.
    fn next_population(&self, ga: &GaInfo, combined: &FitnessMatrix, parents_end: usize)
        -> Vec<usize>;
}

/// Generational replacement: the children replace the parents unconditionally.
#[derive(Debug, Default)]
pub struct KeepChildren;

impl Replacement for KeepChildren {
    fn next_population(
        &self,
        ga: &GaInfo,
        _combined: &FitnessMatrix,
        parents_end: usize,
    ) -> Vec<usize> {
        (parents_end..parents_end + ga.population_size).collect()
    }
}

/// Keep the `n` best parents of the current population, and fill the remaining slots with the
/// first children.
#[derive(Debug)]
pub struct Elitism {
    n: usize,
}

impl Elitism {
    /// Create an elitist replacement keeping the `n` best parents each generation.
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl Replacement for Elitism {
    fn next_population(
        &self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        parents_end: usize,
    ) -> Vec<usize> {
        let n = self.n.min(ga.population_size);

        let parent_fitness: Vec<f64> = (0..parents_end).map(|i| combined.row(i)[0]).collect();
        let sorted_parents = argsort(&parent_fitness, Sort::Descending);

        let mut indices: Vec<usize> = sorted_parents.into_iter().take(n).collect();
        indices.extend(parents_end..parents_end + (ga.population_size - n));
        indices
    }
}

/// Keep the best candidates of the combined parent and child populations.
#[derive(Debug, Default)]
pub struct KeepBest;

impl Replacement for KeepBest {
    fn next_population(
        &self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        _parents_end: usize,
    ) -> Vec<usize> {
        let fitness = combined.column(0);
        let mut indices = argsort(&fitness, Sort::Descending);
        indices.truncate(ga.population_size);
        indices
    }
}

#[cfg(test)]
mod test {
    use crate::core::{FitnessMatrix, GaInfo};

    use super::*;

    fn combined() -> FitnessMatrix {
        // 4 parents followed by 4 children
        FitnessMatrix::from_rows([
            &[5.0][..],
            &[1.0],
            &[3.0],
            &[2.0],
            &[4.0],
            &[0.0],
            &[6.0],
            &[1.5],
        ])
    }

    fn ga_info(fmat: &FitnessMatrix) -> GaInfo {
        GaInfo {
            generation: 1,
            max_generations: 10,
            population_size: 4,
            num_objectives: 1,
            num_fitness_evals: 0,
            fitness_matrix: fmat,
        }
    }

    #[test]
    fn test_keep_children() {
        let fmat = combined();
        let ga = ga_info(&fmat);
        let indices = KeepChildren.next_population(&ga, &fmat, 4);
        assert_eq!(indices, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_elitism() {
        let fmat = combined();
        let ga = ga_info(&fmat);
        let indices = Elitism::new(2).next_population(&ga, &fmat, 4);
        // the 2 best parents followed by the first 2 children
        assert_eq!(indices, vec![0, 2, 4, 5]);
    }

    #[test]
    /// An elite count larger than the population keeps only parents.
    fn test_elitism_saturated() {
        let fmat = combined();
        let ga = ga_info(&fmat);
        let indices = Elitism::new(10).next_population(&ga, &fmat, 4);
        assert_eq!(indices, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_keep_best() {
        let fmat = combined();
        let ga = ga_info(&fmat);
        let indices = KeepBest.next_population(&ga, &fmat, 4);
        assert_eq!(indices, vec![6, 0, 4, 2]);
    }
}
