use crate::utils::{dot_product, perpendicular_distance_sq};

/// Associate a normalised fitness vector with its closest reference direction. The closest
/// direction is the one maximising the scalar product with the normalised vector which, for
/// unit-length directions, also minimises the squared perpendicular distance to the line.
///
/// # Arguments
///
/// * `normalised`: The normalised fitness vector of the candidate.
/// * `reference_points`: The unit-length reference directions.
///
/// returns: `(usize, f64)`. The index of the closest reference direction and the squared
/// perpendicular distance to it.
pub(crate) fn associate(normalised: &[f64], reference_points: &[Vec<f64>]) -> (usize, f64) {
    debug_assert!(!reference_points.is_empty());

    let mut best_index = 0;
    let mut best_projection = f64::NEG_INFINITY;
    for (index, reference) in reference_points.iter().enumerate() {
        let projection = dot_product(normalised, reference);
        if projection > best_projection {
            best_projection = projection;
            best_index = index;
        }
    }

    let distance_sq = perpendicular_distance_sq(&reference_points[best_index], normalised);
    (best_index, distance_sq)
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::utils::normalise_vector;

    use super::associate;

    #[test]
    /// A candidate lying on a reference line has a zero distance to it.
    fn test_point_on_line() {
        let reference_points = vec![
            normalise_vector(&[1.0, 0.0]),
            normalise_vector(&[1.0, 1.0]),
            normalise_vector(&[0.0, 1.0]),
        ];

        let (index, distance_sq) = associate(&[0.5, 0.5], &reference_points);
        assert_eq!(index, 1);
        assert_approx_eq!(f64, distance_sq, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closest_reference() {
        let reference_points = vec![
            normalise_vector(&[1.0, 0.0]),
            normalise_vector(&[1.0, 1.0]),
            normalise_vector(&[0.0, 1.0]),
        ];

        let (index, distance_sq) = associate(&[0.95, 0.15], &reference_points);
        assert_eq!(index, 0);
        assert_approx_eq!(f64, distance_sq, 0.15_f64.powi(2), epsilon = 1e-12);

        let (index, _) = associate(&[0.1, 0.9], &reference_points);
        assert_eq!(index, 2);
    }
}
