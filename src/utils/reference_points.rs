use crate::utils::algebra::{euclidean_distance_sq, normalise_vector};
use crate::utils::qrng::QuasiRandom;

/// Calculate the binomial coefficient, the number of `k`-subsets possible out of a set of `n`
/// distinct items.
///
/// # Arguments
///
/// * `n`: The number of possibilities.
/// * `k`: The number of outcomes.
///
/// returns: `u64`
fn binomial_coefficient(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |result, i| result * (n - i) / (i + 1))
}

/// Derive structured reference points on the unit simplex using the methodology suggested in
/// Section 5.2 of the Das & Dennis (1998) paper:
///
/// > Indraneel Das and J. E. Dennis. Normal-Boundary Intersection: A New Method for Generating
/// > the Pareto Surface in Nonlinear Multicriteria Optimization Problems. SIAM Journal on
/// > Optimization. 1998 8:3, 631-657. <https://doi.org/10.1137/S1052623496307510>
///
/// The points are the lattice coordinates `(h_1 / p, ..., h_d / p)` over all non-negative
/// integer combinations with `h_1 + ... + h_d = p`, where `p` is the number of partitions. This
/// is the generator behind [`reference_directions`] whenever the lattice size matches the
/// requested count.
pub struct DasDarren1998 {
    /// The number of problem objectives.
    number_of_objectives: usize,
    /// The number of uniform gaps between two consecutive points along all objective axis on the
    /// hyperplane.
    number_of_partitions: usize,
}

impl DasDarren1998 {
    /// Initialise the Das & Darren approach to calculate reference points.
    ///
    /// # Arguments
    ///
    /// * `number_of_objectives`: The number of problem objectives.
    /// * `number_of_partitions`: The number of uniform gaps between two consecutive points along
    ///   all objective axis on the hyperplane.
    ///
    /// returns: `DasDarren1998`
    pub fn new(number_of_objectives: usize, number_of_partitions: usize) -> Self {
        Self {
            number_of_objectives,
            number_of_partitions,
        }
    }

    /// Create the generator with the smallest number of partitions producing at least
    /// `min_points` reference points. With two objectives every count is matched exactly; with
    /// more objectives the lattice may overshoot the requested count.
    ///
    /// # Arguments
    ///
    /// * `number_of_objectives`: The number of problem objectives. Must be at least 2.
    /// * `min_points`: The minimum number of reference points to generate.
    ///
    /// returns: `DasDarren1998`
    pub fn with_minimum_points(number_of_objectives: usize, min_points: u64) -> Self {
        debug_assert!(number_of_objectives > 1);

        let mut partitions = 1;
        loop {
            let generator = Self::new(number_of_objectives, partitions);
            if generator.number_of_points() >= min_points {
                return generator;
            }
            partitions += 1;
        }
    }

    /// Determine the number of reference points generated with the configured number of
    /// partitions from Section 5.2 of the paper.
    ///
    /// returns: `u64`. The number of reference points.
    pub fn number_of_points(&self) -> u64 {
        // the number of weak compositions of p into M parts is binom(M + p - 1, p), where M is
        // the number of objectives and p the number of partitions
        binomial_coefficient(
            (self.number_of_objectives + self.number_of_partitions) as u64 - 1,
            self.number_of_partitions as u64,
        )
    }

    /// Generate the vector of reference points.
    ///
    /// return: `Vec<Vec<f64>>`. The vector of points of size [`DasDarren1998::number_of_points`].
    /// Each nested vector, of size equal to the number of objectives, contains the relative
    /// coordinates (between 0 and 1) of the point, and the coordinates of each point sum to 1.
    pub fn get_weights(&self) -> Vec<Vec<f64>> {
        let mut points = Vec::with_capacity(self.number_of_points() as usize);
        let mut prefix = Vec::with_capacity(self.number_of_objectives);
        self.fill_lattice_points(self.number_of_partitions, &mut prefix, &mut points);
        points
    }

    /// Enumerate the lattice points recursively. Every objective but the last takes any share
    /// of the remaining partitions; the last one takes the remainder, so the shares of each
    /// point always sum to the partition count.
    ///
    /// # Arguments
    ///
    /// * `remaining`: The number of partitions left to distribute.
    /// * `prefix`: The partition shares assigned to the leading objectives of the point under
    ///   construction.
    /// * `points`: Collects the finished points.
    fn fill_lattice_points(
        &self,
        remaining: usize,
        prefix: &mut Vec<usize>,
        points: &mut Vec<Vec<f64>>,
    ) {
        if prefix.len() == self.number_of_objectives - 1 {
            let mut point: Vec<f64> = prefix
                .iter()
                .map(|share| *share as f64 / self.number_of_partitions as f64)
                .collect();
            point.push(remaining as f64 / self.number_of_partitions as f64);
            points.push(point);
            return;
        }

        for share in 0..=remaining {
            prefix.push(share);
            self.fill_lattice_points(remaining - share, prefix, points);
            prefix.pop();
        }
    }
}

/// Generate `n` quasi-random points on the unit simplex in `dim` dimensions. The points are
/// derived from a Golden-Ratio low-discrepancy sequence in `dim - 1` dimensions through the
/// sorted-spacings transform, so the set is deterministic.
///
/// # Arguments
///
/// * `dim`: The dimension of the simplex points.
/// * `n`: The number of points to generate.
///
/// returns: `Vec<Vec<f64>>`
pub fn quasirandom_simplex_points(dim: usize, n: usize) -> Vec<Vec<f64>> {
    debug_assert!(dim > 0);

    if dim == 1 {
        return vec![vec![1.0]; n];
    }

    let mut qrng = QuasiRandom::new(dim - 1, 0.5);
    let mut points = Vec::with_capacity(n);
    for _ in 0..n {
        // the spacings between dim - 1 sorted values in [0, 1] split the interval into dim
        // parts that sum to 1
        let mut cuts = qrng.next_point();
        cuts.sort_by(|a, b| a.total_cmp(b));

        let mut point = Vec::with_capacity(dim);
        let mut previous = 0.0;
        for cut in cuts {
            point.push(cut - previous);
            previous = cut;
        }
        point.push(1.0 - previous);
        points.push(point);
    }
    points
}

/// Pick `n` well-spread points from a candidate pool with a greedy farthest-point selection:
/// starting from the last candidate, the point with the largest distance to its closest
/// already-picked point is added until `n` points are chosen.
///
/// # Arguments
///
/// * `candidates`: The candidate pool. Must hold at least `n` points.
/// * `n`: The number of points to pick.
///
/// returns: `Vec<Vec<f64>>`
fn pick_subset(mut candidates: Vec<Vec<f64>>, n: usize) -> Vec<Vec<f64>> {
    debug_assert!(candidates.len() >= n);

    let mut points: Vec<Vec<f64>> = Vec::with_capacity(n);
    points.push(candidates.pop().unwrap());

    // distance of each remaining candidate to its closest already-picked point
    let mut min_distances: Vec<f64> = candidates
        .iter()
        .map(|c| euclidean_distance_sq(c, points.last().unwrap()))
        .collect();

    while points.len() < n {
        let (idx, _) = min_distances
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap();

        points.push(candidates.swap_remove(idx));
        min_distances.swap_remove(idx);

        let last_point = points.last().unwrap();
        for (candidate, min_distance) in candidates.iter().zip(min_distances.iter_mut()) {
            let distance = euclidean_distance_sq(candidate, last_point);
            *min_distance = min_distance.min(distance);
        }
    }
    points
}

/// Generate `n` reference directions in `dim`-dimensional objective space, normalised to unit
/// length. The structured Das & Dennis lattice is used whenever the smallest lattice covering
/// `n` matches the count exactly (always the case with two objectives); for counts between two
/// lattice sizes, the directions are instead picked from a larger quasi-random candidate pool
/// with a greedy farthest-point selection to spread them evenly. Both generators are
/// deterministic for a given `dim` and `n`.
///
/// # Arguments
///
/// * `dim`: The number of objectives.
/// * `n`: The number of reference directions.
///
/// returns: `Vec<Vec<f64>>`
pub fn reference_directions(dim: usize, n: usize) -> Vec<Vec<f64>> {
    debug_assert!(dim > 0 && n > 0);

    if dim == 1 {
        return vec![vec![1.0]; n];
    }

    let lattice = DasDarren1998::with_minimum_points(dim, n as u64);
    let points = if lattice.number_of_points() == n as u64 {
        lattice.get_weights()
    } else {
        let pool_size = n * usize::max(10, 2 * dim);
        pick_subset(quasirandom_simplex_points(dim, pool_size), n)
    };

    points.iter().map(|p| normalise_vector(p)).collect()
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::utils::algebra::vector_magnitude;

    use super::*;

    #[test]
    /// Test the number of points and the weights for a 3-objective problem with 3 partitions
    /// against the values in the Das & Dennis paper.
    fn test_das_darren_weights() {
        let das_darren = DasDarren1998::new(3, 3);
        assert_eq!(das_darren.number_of_points(), 10);

        let weights = das_darren.get_weights();
        assert_eq!(weights.len(), 10);
        for weight in &weights {
            let sum: f64 = weight.iter().sum();
            assert_approx_eq!(f64, sum, 1.0, epsilon = 1e-9);
        }
        assert!(weights.contains(&vec![0.0, 0.0, 1.0]));
        assert!(weights.contains(&vec![1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_das_darren_with_minimum_points() {
        let das_darren = DasDarren1998::with_minimum_points(3, 90);
        assert!(das_darren.number_of_points() >= 90);
        assert_eq!(
            das_darren.get_weights().len() as u64,
            das_darren.number_of_points()
        );

        // with two objectives the lattice matches any count exactly
        let das_darren = DasDarren1998::with_minimum_points(2, 20);
        assert_eq!(das_darren.number_of_points(), 20);
    }

    #[test]
    fn test_simplex_points_sum_to_one() {
        for point in quasirandom_simplex_points(4, 100) {
            assert_eq!(point.len(), 4);
            let sum: f64 = point.iter().sum();
            assert_approx_eq!(f64, sum, 1.0, epsilon = 1e-9);
            assert!(point.iter().all(|x| *x >= 0.0));
        }
    }

    #[test]
    /// A two-objective request is served by the lattice and includes the axis directions.
    fn test_reference_directions_lattice() {
        let directions = reference_directions(2, 20);
        assert_eq!(directions.len(), 20);
        for direction in &directions {
            assert_approx_eq!(f64, vector_magnitude(direction), 1.0, epsilon = 1e-9);
            assert!(direction.iter().all(|x| *x >= 0.0));
        }
        assert!(directions.contains(&vec![1.0, 0.0]));
        assert!(directions.contains(&vec![0.0, 1.0]));
    }

    #[test]
    /// A count between two lattice sizes falls back to the quasi-random pick; the set is still
    /// made of unit vectors and is reproducible.
    fn test_reference_directions_quasirandom() {
        // the 3-objective lattice sizes around 20 are 15 (4 partitions) and 21 (5 partitions)
        let directions = reference_directions(3, 20);
        assert_eq!(directions.len(), 20);
        for direction in &directions {
            assert_approx_eq!(f64, vector_magnitude(direction), 1.0, epsilon = 1e-9);
            assert!(direction.iter().all(|x| *x >= 0.0));
        }

        assert_eq!(directions, reference_directions(3, 20));
    }
}
