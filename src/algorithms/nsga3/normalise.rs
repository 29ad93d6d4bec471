use log::debug;

use crate::core::FitnessMatrix;
use crate::utils::{elementwise_min, vector_max};

/// The floor applied to the ideal-to-nadir range of an objective when the fitness values are
/// normalised.
const MIN_NORMALISATION_RANGE: f64 = 1e-6;

/// The weight given to the off-axis objectives in the achievement scalarising function.
const ASF_OFF_AXIS_WEIGHT: f64 = 1e-6;

/// Update the ideal point with the fitness values of the current generation. The ideal point is
/// the component-wise running maximum of every fitness vector observed since the start of the
/// run.
///
/// # Arguments
///
/// * `ideal`: The ideal point from the previous generation.
/// * `fmat`: The fitness matrix of the combined population.
pub(crate) fn update_ideal_point(ideal: &mut [f64], fmat: &FitnessMatrix) {
    for row in fmat.rows() {
        for (i, value) in ideal.iter_mut().zip(row) {
            if *value > *i {
                *i = *value;
            }
        }
    }
    debug!("set ideal point to {:?}", ideal);
}

/// The achievement scalarising function `max_j (ideal_j - f_j) / w_j`.
///
/// # Arguments
///
/// * `ideal`: The ideal point.
/// * `weights`: The weight vector.
/// * `fitness`: The fitness vector.
///
/// returns: `f64`
fn asf(ideal: &[f64], weights: &[f64], fitness: &[f64]) -> f64 {
    let values: Vec<f64> = ideal
        .iter()
        .zip(weights)
        .zip(fitness)
        .map(|((i, w), f)| (i - f) / w)
        .collect();
    vector_max(&values)
}

/// Update the extreme point of every objective axis. The extreme point along axis `i` is the
/// fitness vector minimising the achievement scalarising function with an axis weight vector
/// (1 at position `i`, a small value elsewhere). The extreme points of the previous generations
/// compete against the candidates of the current one.
///
/// # Arguments
///
/// * `extreme_points`: The extreme points persisted from the previous generation, empty at the
///   start of a run.
/// * `ideal`: The up-to-date ideal point.
/// * `fmat`: The fitness matrix of the combined population.
pub(crate) fn update_extreme_points(
    extreme_points: &mut Vec<Vec<f64>>,
    ideal: &[f64],
    fmat: &FitnessMatrix,
) {
    let num_objectives = ideal.len();
    let previous = std::mem::take(extreme_points);

    for axis in 0..num_objectives {
        let mut weights = vec![ASF_OFF_AXIS_WEIGHT; num_objectives];
        weights[axis] = 1.0;

        let mut best: Option<(f64, &[f64])> = None;
        for point in fmat.rows().chain(previous.iter().map(|p| p.as_slice())) {
            let value = asf(ideal, &weights, point);
            if best.is_none() || value < best.unwrap().0 {
                best = Some((value, point));
            }
        }
        extreme_points.push(best.unwrap().1.to_vec());
    }
    debug!("set extreme points to {:?}", extreme_points);
}

/// Calculate the nadir point as the component-wise minimum of the extreme points.
///
/// # Arguments
///
/// * `extreme_points`: The extreme points, one per objective axis.
///
/// returns: `Vec<f64>`
pub(crate) fn nadir_point(extreme_points: &[Vec<f64>]) -> Vec<f64> {
    let mut nadir = extreme_points[0].clone();
    for point in &extreme_points[1..] {
        nadir = elementwise_min(&nadir, point);
    }
    debug!("set nadir point to {:?}", nadir);
    nadir
}

/// Normalise a fitness vector with respect to the ideal and nadir points:
/// `(ideal_j - f_j) / max(ideal_j - nadir_j, 1e-6)`. The normalised values are non-negative,
/// with better fitness values closer to zero.
///
/// # Arguments
///
/// * `fitness`: The fitness vector to normalise.
/// * `ideal`: The ideal point.
/// * `nadir`: The nadir point.
///
/// returns: `Vec<f64>`
pub(crate) fn normalise_fitness(fitness: &[f64], ideal: &[f64], nadir: &[f64]) -> Vec<f64> {
    fitness
        .iter()
        .zip(ideal)
        .zip(nadir)
        .map(|((f, i), n)| (i - f) / f64::max(i - n, MIN_NORMALISATION_RANGE))
        .collect()
}
