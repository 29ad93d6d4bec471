use rayon::prelude::*;

use crate::core::{Error, FitnessMatrix};
use crate::utils::algebra::volume_between;
use crate::utils::pareto::{pareto_compare, pareto_front};
use crate::utils::vectors::elementwise_min;

/// Calculate the exact hypervolume dominated by a set of fitness points with respect to a
/// reference point, using the WFG algorithm:
///
/// > Lyndon While, Lucas Bradstreet, and Luigi Barone. A Fast Way of Calculating Exact
/// > Hypervolumes. IEEE Transactions on Evolutionary Computation 16(1), 2012.
///
/// The hypervolume of the set is the sum, over the points of its Pareto front, of each point's
/// exclusive hypervolume: the box volume between the point and the reference point, minus the
/// hypervolume of the remaining points limited to the region dominated by the point. The
/// exclusive contribution of each front point is dispatched to the thread pool; the recursive
/// calls run sequentially.
///
/// The reference point must be dominated by every point of the front. Points with infinite
/// coordinates dominate an infinite region, making the result infinite.
///
/// # Arguments
///
/// * `fmat`: The fitness matrix. Dominated rows do not contribute to the hypervolume.
/// * `reference_point`: The reference point coordinates.
///
/// returns: `Result<f64, Error>`
pub fn hypervolume(fmat: &FitnessMatrix, reference_point: &[f64]) -> Result<f64, Error> {
    if fmat.is_empty() {
        return Ok(0.0);
    }
    if fmat.ncols() != reference_point.len() {
        return Err(Error::Metric(
            "hypervolume".to_string(),
            format!(
                "the number of objectives ({}) must match the number of coordinates of the reference point ({})",
                fmat.ncols(),
                reference_point.len()
            ),
        ));
    }

    let mut front: Vec<Vec<f64>> = pareto_front(fmat)
        .into_iter()
        .map(|i| fmat.row(i).to_vec())
        .collect();

    for point in &front {
        if point.iter().any(|v| v.is_nan()) {
            return Err(Error::Metric(
                "hypervolume".to_string(),
                "NaN detected in a fitness point".to_string(),
            ));
        }
        if point.iter().zip(reference_point).any(|(v, r)| v < r) {
            return Err(Error::Metric(
                "hypervolume".to_string(),
                format!(
                    "the reference point {:?} must be dominated by every point of the front",
                    reference_point
                ),
            ));
        }
        if point.iter().any(|v| v.is_infinite()) {
            return Ok(f64::INFINITY);
        }
    }

    sort_front(&mut front);

    // each point's exclusive hypervolume is independent of the others, so the top level is
    // dispatched to the pool. Collecting before the sum keeps the addition order fixed.
    let exclusive_volumes: Vec<f64> = (0..front.len())
        .into_par_iter()
        .map(|idx| exclusive_hypervolume(&front[idx], &front[idx + 1..], reference_point))
        .collect();

    Ok(exclusive_volumes.iter().sum())
}

/// Sort the front points by descending first objective. The recursion is correct for any point
/// order; sorting keeps the limit sets small.
fn sort_front(front: &mut [Vec<f64>]) {
    front.sort_by(|a, b| b[0].total_cmp(&a[0]));
}

/// The hypervolume of the region dominated by `point` but by none of the points in `rest`.
fn exclusive_hypervolume(point: &[f64], rest: &[Vec<f64>], reference_point: &[f64]) -> f64 {
    let inclusive = volume_between(point, reference_point);
    if rest.is_empty() {
        return inclusive;
    }

    // limit the remaining points to the region dominated by `point`
    let limited: Vec<Vec<f64>> = rest
        .iter()
        .map(|other| elementwise_min(other, point))
        .collect();

    inclusive - sequential_hypervolume(limited, reference_point)
}

/// Sequential WFG recursion over an already-limited point set.
fn sequential_hypervolume(points: Vec<Vec<f64>>, reference_point: &[f64]) -> f64 {
    let mut front = non_dominated(points);
    sort_front(&mut front);

    front
        .iter()
        .enumerate()
        .map(|(idx, point)| exclusive_hypervolume(point, &front[idx + 1..], reference_point))
        .sum()
}

/// Keep the non-dominated points of the set, dropping exact duplicates.
fn non_dominated(points: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    let mut front: Vec<Vec<f64>> = Vec::with_capacity(points.len());
    for point in points {
        if front
            .iter()
            .any(|kept| kept == &point || pareto_compare(&point, kept) == -1)
        {
            continue;
        }
        front.retain(|kept| pareto_compare(kept, &point) != -1);
        front.push(point);
    }
    front
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::core::FitnessMatrix;

    use super::hypervolume;

    fn matrix(rows: &[Vec<f64>]) -> FitnessMatrix {
        FitnessMatrix::from_rows(rows.iter().map(|r| r.as_slice()))
    }

    #[test]
    /// The hypervolume of a single point is the box volume between the point and the reference.
    fn test_single_point() {
        let fmat = matrix(&[vec![3.0, 2.0]]);
        let hv = hypervolume(&fmat, &[1.0, 1.0]).unwrap();
        assert_approx_eq!(f64, hv, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_overlapping_points() {
        let fmat = matrix(&[vec![2.0, 1.0], vec![1.0, 2.0]]);
        // two unit boxes sharing a 1x1 corner region
        let hv = hypervolume(&fmat, &[0.0, 0.0]).unwrap();
        assert_approx_eq!(f64, hv, 3.0, epsilon = 1e-12);
    }

    #[test]
    /// Adding a dominated point does not change the hypervolume.
    fn test_dominated_point_is_ignored() {
        let fmat = matrix(&[vec![2.0, 1.0], vec![1.0, 2.0]]);
        let with_dominated = matrix(&[vec![2.0, 1.0], vec![1.0, 2.0], vec![0.5, 0.5]]);

        let hv = hypervolume(&fmat, &[0.0, 0.0]).unwrap();
        let hv_dominated = hypervolume(&with_dominated, &[0.0, 0.0]).unwrap();
        assert_approx_eq!(f64, hv, hv_dominated, epsilon = 1e-12);
    }

    #[test]
    /// Relaxing the reference point increases the hypervolume.
    fn test_reference_point_monotonicity() {
        let fmat = matrix(&[vec![2.0, 1.0], vec![1.0, 2.0]]);
        let hv = hypervolume(&fmat, &[0.0, 0.0]).unwrap();
        let hv_relaxed = hypervolume(&fmat, &[-1.0, -1.0]).unwrap();
        assert!(hv_relaxed > hv);
    }

    #[test]
    /// The 3D example set against the origin. The exact value was calculated by hand from the
    /// box decomposition of the union.
    fn test_exact_3d() {
        let fmat = matrix(&[
            vec![10.0, 10.0, 10.0],
            vec![11.0, 8.0, 3.0],
            vec![4.0, 4.0, 18.0],
            vec![12.0, 2.0, 6.0],
            vec![10.0, 8.0, 10.0],
            vec![8.0, 13.0, 8.0],
            vec![1.0, 1.0, 9.0],
            vec![40.0, 0.0, 0.0],
        ]);
        let hv = hypervolume(&fmat, &[0.0, 0.0, 0.0]).unwrap();
        assert_approx_eq!(f64, hv, 1362.0, epsilon = 1e-8);
    }

    #[test]
    fn test_infinite_coordinates() {
        let fmat = matrix(&[vec![f64::INFINITY, 1.0], vec![1.0, 2.0]]);
        let hv = hypervolume(&fmat, &[0.0, 0.0]).unwrap();
        assert_eq!(hv, f64::INFINITY);
    }

    #[test]
    fn test_invalid_reference_point() {
        let fmat = matrix(&[vec![2.0, 1.0]]);
        assert!(hypervolume(&fmat, &[0.0, 1.5]).is_err());
        assert!(hypervolume(&fmat, &[0.0]).is_err());
    }

    #[test]
    fn test_empty_set() {
        let fmat = FitnessMatrix::empty(2);
        assert_eq!(hypervolume(&fmat, &[0.0, 0.0]).unwrap(), 0.0);
    }
}
