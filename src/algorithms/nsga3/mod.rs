use log::debug;
use rand::{Rng, RngCore};

use crate::algorithms::Algorithm;
use crate::core::{Error, FitnessMatrix, GaInfo};
use crate::utils::{fast_non_dominated_sort, reference_directions};

use associate::associate;
use niching::{niche_select, PendingCandidate};
use normalise::{nadir_point, normalise_fitness, update_extreme_points, update_ideal_point};

mod associate;
mod niching;
mod normalise;

/// The reference-point association of one candidate of the current population.
#[derive(Clone, Copy, Debug)]
struct CandidateMeta {
    /// The Pareto rank.
    rank: usize,
    /// The index of the closest reference direction.
    ref_idx: usize,
    /// The squared perpendicular distance to that direction.
    ref_dist: f64,
}

/// The Non-dominated Sorting Genetic Algorithm for many objectives (NSGA3).
///
/// Implemented based on:
/// > K. Deb and H. Jain, "An Evolutionary Many-Objective Optimization Algorithm Using
/// > Reference-Point-Based Non-dominated Sorting Approach, Part I: Solving Problems With Box
/// > Constraints," in IEEE Transactions on Evolutionary Computation, vol. 18, no. 4,
/// > pp. 577-601, Aug. 2014, doi: 10.1109/TEVC.2013.2281535
///
/// NSGA3 replaces the crowding distance of NSGA2 with an association to a fixed set of
/// reference directions in objective space. The algorithm persists the reference directions,
/// the ideal, extreme and nadir points, the per-candidate `(rank, reference, distance)`
/// association and the niche count of every direction across generations; the extreme points of
/// earlier generations compete against new candidates.
///
/// NSGA3 requires at least two objectives and fails at [`Algorithm::initialize`] otherwise.
#[derive(Debug, Default)]
pub struct Nsga3 {
    /// The unit-length reference directions, generated once per run.
    reference_points: Vec<Vec<f64>>,
    /// The ideal point, the running maximum of every observed fitness vector.
    ideal: Vec<f64>,
    /// The extreme point of each objective axis.
    extreme_points: Vec<Vec<f64>>,
    /// The nadir point, the component-wise minimum of the extreme points.
    nadir: Vec<f64>,
    /// The rank and reference association of every candidate of the current population.
    meta: Vec<CandidateMeta>,
    /// The number of current-population candidates associated with each reference direction.
    niche_counts: Vec<usize>,
}

impl Nsga3 {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference directions used in the evolution. Empty until the algorithm is
    /// initialised.
    pub fn reference_points(&self) -> &[Vec<f64>] {
        &self.reference_points
    }

    /// Normalise the fitness vector of a combined-matrix row and associate it with its closest
    /// reference direction.
    fn associate_row(&self, fmat: &FitnessMatrix, row: usize) -> (usize, f64) {
        let normalised = normalise_fitness(fmat.row(row), &self.ideal, &self.nadir);
        associate(&normalised, &self.reference_points)
    }

    /// Update the ideal, extreme and nadir points from the fitness of the combined population.
    fn update_normalisation_points(&mut self, fmat: &FitnessMatrix) {
        update_ideal_point(&mut self.ideal, fmat);
        update_extreme_points(&mut self.extreme_points, &self.ideal, fmat);
        self.nadir = nadir_point(&self.extreme_points);
    }
}

impl Algorithm for Nsga3 {
    fn name(&self) -> &'static str {
        "NSGA3"
    }

    /// This generates the reference directions, assesses the initial population and stores the
    /// rank and reference association of every candidate needed by [`Algorithm::select`].
    fn initialize(&mut self, ga: &GaInfo) -> Result<(), Error> {
        if ga.num_objectives < 2 {
            return Err(Error::WrongAlgorithm(
                self.name().to_string(),
                ga.num_objectives,
            ));
        }

        self.reference_points = reference_directions(ga.num_objectives, ga.population_size);
        debug!("created {} reference directions", self.reference_points.len());

        let fmat = ga.fitness_matrix;
        self.ideal = vec![f64::NEG_INFINITY; ga.num_objectives];
        self.extreme_points.clear();
        self.update_normalisation_points(fmat);

        let sorting = fast_non_dominated_sort(fmat, false);
        self.meta = (0..fmat.nrows())
            .map(|row| {
                let (ref_idx, ref_dist) = self.associate_row(fmat, row);
                CandidateMeta {
                    rank: sorting.ranks[row],
                    ref_idx,
                    ref_dist,
                }
            })
            .collect();

        self.niche_counts = vec![0; self.reference_points.len()];
        for meta in &self.meta {
            self.niche_counts[meta.ref_idx] += 1;
        }
        Ok(())
    }

    /// Niched binary tournament: two candidates sharing a reference direction compete on rank
    /// and then on reference distance; candidates of different directions are picked uniformly.
    fn select(&self, _ga: &GaInfo, rng: &mut dyn RngCore) -> usize {
        let first = rng.gen_range(0..self.meta.len());
        let second = rng.gen_range(0..self.meta.len());
        let (a, b) = (&self.meta[first], &self.meta[second]);

        if a.ref_idx != b.ref_idx {
            if rng.gen_bool(0.5) {
                first
            } else {
                second
            }
        } else if a.rank < b.rank {
            first
        } else if a.rank > b.rank {
            second
        } else if a.ref_dist < b.ref_dist {
            first
        } else {
            second
        }
    }

    /// This implements the environmental selection of Section IV of the paper: whole fronts are
    /// accepted by ascending rank, and the splitting front is decomposed with the
    /// niche-preservation operation over the reference directions.
    fn next_population(
        &mut self,
        ga: &GaInfo,
        combined: &FitnessMatrix,
        _parents_end: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, Error> {
        let sorting = fast_non_dominated_sort(combined, false);
        debug!("collected {} fronts", sorting.fronts.len());

        // Algorithm 1, steps 5-7: accept whole fronts while they fit
        let mut accepted: Vec<usize> = Vec::with_capacity(ga.population_size);
        let mut splitting_front: Option<&Vec<usize>> = None;
        for front in &sorting.fronts {
            if accepted.len() + front.len() <= ga.population_size {
                accepted.extend_from_slice(front);
                if accepted.len() == ga.population_size {
                    break;
                }
            } else {
                splitting_front = Some(front);
                break;
            }
        }

        // Algorithm 2: adaptive normalisation over the whole combined population
        self.update_normalisation_points(combined);

        // Algorithm 3: associate the accepted fronts, count the niches over them only
        let mut niche_counts = vec![0_usize; self.reference_points.len()];
        let mut meta: Vec<CandidateMeta> = Vec::with_capacity(ga.population_size);
        for row in &accepted {
            let (ref_idx, ref_dist) = self.associate_row(combined, *row);
            niche_counts[ref_idx] += 1;
            meta.push(CandidateMeta {
                rank: sorting.ranks[*row],
                ref_idx,
                ref_dist,
            });
        }

        let mut indices = accepted;

        // Algorithm 4: fill the remaining slots from the splitting front
        if let Some(front) = splitting_front {
            let missing = ga.population_size - indices.len();
            debug!("taking {missing} candidates from the splitting front with niching");

            let mut pending: Vec<PendingCandidate> = front
                .iter()
                .map(|row| {
                    let (ref_idx, ref_dist) = self.associate_row(combined, *row);
                    PendingCandidate {
                        index: *row,
                        ref_idx,
                        ref_dist,
                    }
                })
                .collect();

            for candidate in niche_select(&mut pending, &mut niche_counts, missing, rng) {
                indices.push(candidate.index);
                meta.push(CandidateMeta {
                    rank: sorting.ranks[candidate.index],
                    ref_idx: candidate.ref_idx,
                    ref_dist: candidate.ref_dist,
                });
            }
        }

        self.meta = meta;
        self.niche_counts = niche_counts;
        Ok(indices)
    }

    /// The candidates with rank 0.
    fn optimal_indices(&self, _fmat: &FitnessMatrix) -> Vec<usize> {
        self.meta
            .iter()
            .enumerate()
            .filter(|(_, meta)| meta.rank == 0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::core::{Error, FitnessMatrix, GaInfo};

    use super::*;

    fn matrix(rows: &[Vec<f64>]) -> FitnessMatrix {
        FitnessMatrix::from_rows(rows.iter().map(|r| r.as_slice()))
    }

    fn ga_info<'a>(fmat: &'a FitnessMatrix, population_size: usize) -> GaInfo<'a> {
        GaInfo {
            generation: 0,
            max_generations: 100,
            population_size,
            num_objectives: fmat.ncols(),
            num_fitness_evals: 0,
            fitness_matrix: fmat,
        }
    }

    #[test]
    fn test_single_objective_is_rejected() {
        let fmat = matrix(&[vec![1.0], vec![2.0]]);
        let ga = ga_info(&fmat, 2);
        let mut algorithm = Nsga3::new();
        assert!(matches!(
            algorithm.initialize(&ga),
            Err(Error::WrongAlgorithm(_, 1))
        ));
    }

    #[test]
    /// Initialisation creates roughly population-size reference directions and associates every
    /// candidate with one of them.
    fn test_initialize() {
        let fmat = matrix(&[
            vec![4.0, 1.0],
            vec![1.0, 4.0],
            vec![3.0, 3.0],
            vec![0.5, 0.5],
        ]);
        let ga = ga_info(&fmat, 4);
        let mut algorithm = Nsga3::new();
        algorithm.initialize(&ga).unwrap();

        assert_eq!(algorithm.reference_points().len(), 4);
        assert_eq!(algorithm.meta.len(), 4);
        assert_eq!(algorithm.niche_counts.iter().sum::<usize>(), 4);

        // (0.5, 0.5) is the only dominated candidate
        assert_eq!(algorithm.optimal_indices(&fmat), vec![0, 1, 2]);
    }

    #[test]
    /// The next population is drawn from parents and children without duplicates and the niche
    /// counts track the retained candidates.
    fn test_next_population() {
        let initial = matrix(&[
            vec![4.0, 1.0],
            vec![1.0, 4.0],
            vec![3.0, 3.0],
            vec![0.5, 0.5],
        ]);
        let ga = ga_info(&initial, 4);
        let mut algorithm = Nsga3::new();
        algorithm.initialize(&ga).unwrap();

        let combined = matrix(&[
            vec![4.0, 1.0],
            vec![1.0, 4.0],
            vec![3.0, 3.0],
            vec![0.5, 0.5],
            vec![5.0, 0.5],
            vec![2.0, 3.5],
            vec![0.1, 0.1],
            vec![4.0, 4.0],
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let next = algorithm
            .next_population(&ga, &combined, 4, &mut rng)
            .unwrap();

        assert_eq!(next.len(), 4);
        let mut unique = next.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 4, "no index may be selected twice");
        assert!(!next.contains(&6), "the dominated candidate must not survive");

        assert_eq!(algorithm.meta.len(), 4);
        assert_eq!(algorithm.niche_counts.iter().sum::<usize>(), 4);
    }

    #[test]
    /// The ideal point keeps improving across next_population calls.
    fn test_ideal_point_tracks_runs() {
        let initial = matrix(&[vec![1.0, 1.0], vec![0.0, 2.0]]);
        let ga = ga_info(&initial, 2);
        let mut algorithm = Nsga3::new();
        algorithm.initialize(&ga).unwrap();
        assert_eq!(algorithm.ideal, vec![1.0, 2.0]);

        let combined = matrix(&[
            vec![1.0, 1.0],
            vec![0.0, 2.0],
            vec![3.0, 0.5],
            vec![0.5, 0.5],
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        algorithm
            .next_population(&ga, &combined, 2, &mut rng)
            .unwrap();
        assert_eq!(algorithm.ideal, vec![3.0, 2.0]);
    }
}
