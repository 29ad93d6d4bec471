use log::debug;
use ordered_float::OrderedFloat;
use rand::{Rng, RngCore};

use crate::algorithms::Algorithm;
use crate::core::{Error, FitnessMatrix, GaInfo};
use crate::utils::{argsort, fast_non_dominated_sort, Sort};

/// The denominator floor used when an objective has a degenerate value range in the crowding
/// distance calculation.
const MIN_OBJECTIVE_RANGE: f64 = 1e-8;

/// The Non-dominated Sorting Genetic Algorithm (NSGA2).
///
/// Implemented based on:
/// > K. Deb, A. Pratap, S. Agarwal and T. Meyarivan, "A fast and elitist multi-objective genetic
/// > algorithm: NSGA-II," in IEEE Transactions on Evolutionary Computation, vol. 6, no. 2, pp.
/// > 182-197, April 2002, doi: 10.1109/4235.996017.
///
/// The algorithm keeps the Pareto rank and the crowding distance of every candidate of the
/// current population between generations. Parents are chosen with a binary tournament
/// preferring lower ranks and, within the same rank, larger crowding distances; survivors are
/// chosen front-by-front, splitting the last front by descending crowding distance.
///
/// NSGA2 requires at least two objectives and fails at [`Algorithm::initialize`] otherwise.
#[derive(Debug, Default)]
pub struct Nsga2 {
    /// The Pareto rank of each candidate of the current population.
    ranks: Vec<usize>,
    /// The crowding distance of each candidate of the current population.
    crowding_distances: Vec<f64>,
}

impl Nsga2 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the crowding distance of the members of one non-dominated front. For every
    /// objective, the front members are sorted by that objective; the two extremes get an
    /// infinite distance and an interior member gains the distance of its two neighbours,
    /// normalised by the objective range. The contributions of all objectives are summed.
    ///
    /// # Arguments
    ///
    /// * `front`: The matrix row indices of the front members.
    /// * `fmat`: The fitness matrix.
    ///
    /// returns: `Vec<f64>`. The distances, aligned with `front`.
    pub(crate) fn crowding_distances(front: &[usize], fmat: &FitnessMatrix) -> Vec<f64> {
        let mut distances = vec![0.0; front.len()];
        if front.is_empty() {
            return distances;
        }

        for obj in 0..fmat.ncols() {
            let values: Vec<f64> = front.iter().map(|i| fmat.row(*i)[obj]).collect();
            let sorted = argsort(&values, Sort::Ascending);

            distances[sorted[0]] = f64::INFINITY;
            distances[sorted[sorted.len() - 1]] = f64::INFINITY;

            let range = f64::max(
                values[sorted[sorted.len() - 1]] - values[sorted[0]],
                MIN_OBJECTIVE_RANGE,
            );
            for t in 1..sorted.len().saturating_sub(1) {
                let delta = values[sorted[t + 1]] - values[sorted[t - 1]];
                distances[sorted[t]] += delta / range;
            }
        }
        distances
    }
}

impl Algorithm for Nsga2 {
    fn name(&self) -> &'static str {
        "NSGA2"
    }

    /// This assesses the initial population and sets the candidate ranks and crowding distances
    /// needed by [`Algorithm::select`].
    fn initialize(&mut self, ga: &GaInfo) -> Result<(), Error> {
        if ga.num_objectives < 2 {
            return Err(Error::WrongAlgorithm(
                self.name().to_string(),
                ga.num_objectives,
            ));
        }

        let fmat = ga.fitness_matrix;
        let sorting = fast_non_dominated_sort(fmat, false);
        self.ranks = sorting.ranks;

        self.crowding_distances = vec![0.0; fmat.nrows()];
        for front in &sorting.fronts {
            for (member, distance) in front.iter().zip(Self::crowding_distances(front, fmat)) {
                self.crowding_distances[*member] = distance;
            }
        }
        Ok(())
    }

    /// Binary crowded tournament: prefer the lower rank, break rank ties with the larger
    /// crowding distance, and pick the second candidate on a full tie.
    fn select(&self, _ga: &GaInfo, rng: &mut dyn RngCore) -> usize {
        let first = rng.gen_range(0..self.ranks.len());
        let second = rng.gen_range(0..self.ranks.len());

        if self.ranks[first] < self.ranks[second] {
            first
        } else if self.ranks[first] > self.ranks[second] {
            second
        } else if self.crowding_distances[first] > self.crowding_distances[second] {
            first
        } else {
            second
        }
    }

    /// This implements the elitist survivor selection at the bottom of page 186 in
    /// Deb et al. (2002): whole fronts are taken by ascending rank until the next front would
    /// overflow the population, and that front is split by descending crowding distance.
    fn next_population(
        &mut self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        _parents_end: usize,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, Error> {
        let sorting = fast_non_dominated_sort(combined, false);
        debug!("collected {} fronts", sorting.fronts.len());

        let mut indices: Vec<usize> = Vec::with_capacity(ga.population_size);
        let mut ranks: Vec<usize> = Vec::with_capacity(ga.population_size);
        let mut distances: Vec<f64> = Vec::with_capacity(ga.population_size);

        for (rank, front) in sorting.fronts.iter().enumerate() {
            let front_distances = Self::crowding_distances(front, combined);

            if indices.len() + front.len() <= ga.population_size {
                // the entire front fits
                indices.extend_from_slice(front);
                ranks.extend(std::iter::repeat(rank).take(front.len()));
                distances.extend_from_slice(&front_distances);
            } else {
                // splitting front: prioritise the members with the largest crowding distance
                let missing = ga.population_size - indices.len();
                debug!("taking {missing} candidates from the splitting front (rank {rank})");

                let mut members: Vec<usize> = (0..front.len()).collect();
                members.sort_by_key(|m| std::cmp::Reverse(OrderedFloat(front_distances[*m])));
                for member in members.into_iter().take(missing) {
                    indices.push(front[member]);
                    ranks.push(rank);
                    distances.push(front_distances[member]);
                }
            }

            if indices.len() == ga.population_size {
                break;
            }
        }

        self.ranks = ranks;
        self.crowding_distances = distances;
        Ok(indices)
    }

    /// The candidates with rank 0.
    fn optimal_indices(&self, _fmat: &FitnessMatrix) -> Vec<usize> {
        self.ranks
            .iter()
            .enumerate()
            .filter(|(_, rank)| **rank == 0)
            .map(|(i, _)| i)
            .collect()
    }
}


#[cfg(test)]
mod test_problems {
    use crate::algorithms::{GeneticAlgorithmBuilder, Nsga2};
    use crate::core::builtin_problems::Kursawe;
    use crate::operators::{PolynomialMutation, SimulatedBinaryCrossover};
    use crate::utils::pareto_compare;

    #[test]
    /// The two-variable Kursawe problem with NSGA2. The final population holds a spread of
    /// mutually non-dominated rank-0 solutions.
    fn test_kursawe() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut ga = GeneticAlgorithmBuilder::new(
            Kursawe::create(2, 0.0, std::f64::consts::PI).unwrap(),
            SimulatedBinaryCrossover::default(),
            PolynomialMutation::default(),
        )
        .with_algorithm(Nsga2::new())
        .with_population_size(40)
        .with_max_generations(200)
        .with_seed(21)
        .build()
        .unwrap();
        ga.solve().unwrap();

        let solutions = ga.solutions();
        assert!(solutions.len() >= 2);
        for (i, a) in solutions.iter().enumerate() {
            for (j, b) in solutions.iter().enumerate() {
                if i != j {
                    assert_ne!(pareto_compare(a.fitness(), b.fitness()), -1);
                }
            }
        }
    }
}
