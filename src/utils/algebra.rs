/// Calculate the dot product between two vectors. This panics in debug builds if the size of the
/// vectors does not match.
///
/// # Arguments
///
/// * `a`: The first vector.
/// * `b`: The second vector.
///
/// returns: `f64`
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Get the vector magnitude or length.
///
/// # Arguments
///
/// * `vector`: The vector.
///
/// returns: `f64`
pub fn vector_magnitude(vector: &[f64]) -> f64 {
    dot_product(vector, vector).sqrt()
}

/// Normalise a vector by dividing each component by the vector magnitude.
///
/// # Arguments
///
/// * `vector`: The vector to normalise.
///
/// returns: `Vec<f64>`
pub fn normalise_vector(vector: &[f64]) -> Vec<f64> {
    let magnitude = vector_magnitude(vector);
    vector.iter().map(|v| v / magnitude).collect()
}

/// Calculate the square of the Euclidean distance between two points.
///
/// # Arguments
///
/// * `a`: The first point.
/// * `b`: The second point.
///
/// returns: `f64`
pub fn euclidean_distance_sq(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Calculate the square of the perpendicular distance between a line passing through the origin
/// with unit direction `line` and a `point`. This is the squared distance between the point and
/// its projection onto the line.
///
/// # Arguments
///
/// * `line`: The unit vector of the reference line.
/// * `point`: The point coordinates.
///
/// returns: `f64`
pub fn perpendicular_distance_sq(line: &[f64], point: &[f64]) -> f64 {
    let projection = dot_product(point, line);
    let distance_sq = dot_product(point, point) - projection * projection;

    // guard against negative values from floating point cancellation
    distance_sq.max(0.0)
}

/// Calculate the volume of the hyper-rectangle spanned by two points.
///
/// # Arguments
///
/// * `p1`: The first corner point.
/// * `p2`: The second corner point.
///
/// returns: `f64`
pub fn volume_between(p1: &[f64], p2: &[f64]) -> f64 {
    debug_assert_eq!(p1.len(), p2.len());
    p1.iter().zip(p2).map(|(a, b)| (a - b).abs()).product()
}

/// Calculate the arithmetic mean of the values in the vector.
pub fn mean(values: &[f64]) -> f64 {
    debug_assert!(!values.is_empty());
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the sample standard deviation of the values in the vector around the given mean.
///
/// # Arguments
///
/// * `values`: The values.
/// * `mean`: The arithmetic mean of the values.
///
/// returns: `f64`
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_dot_product() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, -5.0, 6.0];
        assert_eq!(12.0, dot_product(&a, &b));
    }

    #[test]
    fn test_normalise_vector() {
        let v = normalise_vector(&[3.0, 4.0]);
        assert_approx_eq!(f64, v[0], 0.6, epsilon = 1e-12);
        assert_approx_eq!(f64, v[1], 0.8, epsilon = 1e-12);
        assert_approx_eq!(f64, vector_magnitude(&v), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perpendicular_distance() {
        // line along the diagonal of the 3D unit cube
        let line = normalise_vector(&[1.0, 1.0, 1.0]);
        let point = vec![0.0, 0.0, 2.0];
        assert_approx_eq!(
            f64,
            perpendicular_distance_sq(&line, &point).sqrt(),
            1.632993,
            epsilon = 0.0001
        );
    }

    #[test]
    fn test_volume_between() {
        assert_eq!(volume_between(&[3.0, 2.0], &[1.0, 1.0]), 2.0);
        assert_eq!(volume_between(&[1.0, 1.0, 1.0], &[0.0, 0.0, 0.0]), 1.0);
        assert_eq!(
            volume_between(&[f64::INFINITY, 1.0], &[0.0, 0.0]),
            f64::INFINITY
        );
    }

    #[test]
    fn test_mean_and_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert_approx_eq!(f64, m, 5.0, epsilon = 1e-12);
        assert_approx_eq!(f64, std_dev(&values, m), 2.13809, epsilon = 1e-4);
    }
}
