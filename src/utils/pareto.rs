use std::sync::atomic::{AtomicU8, Ordering as MemOrdering};

use rayon::prelude::*;

use crate::core::FitnessMatrix;
use crate::utils::floats::{float_compare, float_is_equal};
use crate::utils::vectors::argsort;
use crate::utils::Sort;

/// Pareto-compare two fitness vectors of equal length, assuming maximisation. A vector `a` is
/// dominated by `b` when every component of `a` is not greater than the corresponding component
/// of `b` under the tolerant float comparison, and at least one component is strictly less.
///
/// # Arguments
///
/// * `lhs`: The first fitness vector.
/// * `rhs`: The second fitness vector.
///
/// returns: `i8`. `-1` when `lhs` is dominated by `rhs`, `1` when `rhs` is dominated by `lhs`
/// and `0` otherwise.
pub fn pareto_compare(lhs: &[f64], rhs: &[f64]) -> i8 {
    debug_assert_eq!(lhs.len(), rhs.len());

    let mut relation = 0_i8;
    for (a, b) in lhs.iter().zip(rhs) {
        match float_compare(*a, *b) {
            std::cmp::Ordering::Less => {
                if relation == 1 {
                    return 0;
                }
                relation = -1;
            }
            std::cmp::Ordering::Greater => {
                if relation == -1 {
                    return 0;
                }
                relation = 1;
            }
            std::cmp::Ordering::Equal => {}
        }
    }
    relation
}

/// Return `true` when `lhs` is Pareto-dominated by `rhs`.
pub fn pareto_dominated(lhs: &[f64], rhs: &[f64]) -> bool {
    pareto_compare(lhs, rhs) == -1
}

/// Find the indices of the non-dominated rows of a fitness matrix. An empty matrix yields an
/// empty front. The returned set contains no duplicate indices.
///
/// Single-objective matrices use a linear pass keeping the rows whose fitness equals the maximum
/// under the tolerant comparison. The general case sorts the rows by their first objective so a
/// row can only be dominated by rows sorted before it, then compares each row against the
/// members of the front found so far.
///
/// # Arguments
///
/// * `fmat`: The fitness matrix.
///
/// returns: `Vec<usize>`
pub fn pareto_front(fmat: &FitnessMatrix) -> Vec<usize> {
    if fmat.is_empty() {
        return Vec::new();
    }

    if fmat.ncols() == 1 {
        // single objective fast path
        let max = fmat.max_fitness()[0];
        return (0..fmat.nrows())
            .filter(|i| float_is_equal(fmat.row(*i)[0], max))
            .collect();
    }

    let sorted = argsort(&fmat.column(0), Sort::Descending);

    let mut front: Vec<usize> = Vec::new();
    for idx in sorted {
        let dominated = front
            .iter()
            .any(|kept| pareto_dominated(fmat.row(idx), fmat.row(*kept)));
        if !dominated {
            front.push(idx);
        }
    }

    // a second pass removes rows whose dominator sorted after them because the first objectives
    // are equal within the float tolerance
    let mut cleaned: Vec<usize> = front
        .iter()
        .filter(|i| {
            !front
                .iter()
                .any(|j| *j != **i && pareto_dominated(fmat.row(**i), fmat.row(*j)))
        })
        .copied()
        .collect();
    cleaned.sort_unstable();
    cleaned
}

/// The dominance state of a candidate during a Pareto-set merge. Transitions are monotone:
/// `Unknown` may become `Optimal` or `Dominated`, and `Optimal` may only become `Dominated`, so
/// the states can be written with relaxed atomics from multiple threads without changing the
/// merge outcome.
const UNKNOWN: u8 = 0;
const OPTIMAL: u8 = 1;
const DOMINATED: u8 = 2;

/// Merge two Pareto sets. Given two sets that are each internally non-dominated, this returns
/// the indices of the members of each set that belong to the Pareto front of the union.
///
/// The outer loop runs in parallel over the larger side; the per-candidate dominance states are
/// shared between the workers as relaxed atomics.
///
/// # Arguments
///
/// * `left`: The fitness vectors of the first Pareto set.
/// * `right`: The fitness vectors of the second Pareto set.
///
/// returns: `(Vec<usize>, Vec<usize>)`. The retained indices of `left` and of `right`.
pub fn pareto_set_merge(left: &[&[f64]], right: &[&[f64]]) -> (Vec<usize>, Vec<usize>) {
    if left.is_empty() {
        return (Vec::new(), (0..right.len()).collect());
    }
    if right.is_empty() {
        return ((0..left.len()).collect(), Vec::new());
    }

    // swap so the parallel outer loop always runs over the larger side
    let swapped = right.len() > left.len();
    let (outer, inner) = if swapped { (right, left) } else { (left, right) };

    let outer_states: Vec<AtomicU8> = (0..outer.len()).map(|_| AtomicU8::new(UNKNOWN)).collect();
    let inner_states: Vec<AtomicU8> = (0..inner.len()).map(|_| AtomicU8::new(UNKNOWN)).collect();

    outer
        .par_iter()
        .zip(outer_states.par_iter())
        .for_each(|(outer_fitness, outer_state)| {
            let mut dominated = false;
            for (inner_fitness, inner_state) in inner.iter().zip(&inner_states) {
                match pareto_compare(outer_fitness, inner_fitness) {
                    -1 => {
                        dominated = true;
                        break;
                    }
                    1 => inner_state.store(DOMINATED, MemOrdering::Relaxed),
                    _ => {}
                }
            }
            let state = if dominated { DOMINATED } else { OPTIMAL };
            outer_state.store(state, MemOrdering::Relaxed);
        });

    let keep = |states: &[AtomicU8]| -> Vec<usize> {
        states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.load(MemOrdering::Relaxed) != DOMINATED)
            .map(|(i, _)| i)
            .collect()
    };

    let outer_kept = keep(&outer_states);
    let inner_kept = keep(&inner_states);
    if swapped {
        (inner_kept, outer_kept)
    } else {
        (outer_kept, inner_kept)
    }
}

#[cfg(test)]
mod test {
    use crate::core::FitnessMatrix;

    use super::*;

    #[test]
    fn test_pareto_compare() {
        assert_eq!(pareto_compare(&[1.0, 1.0], &[2.0, 2.0]), -1);
        assert_eq!(pareto_compare(&[2.0, 2.0], &[1.0, 1.0]), 1);
        assert_eq!(pareto_compare(&[1.0, 2.0], &[2.0, 1.0]), 0);
        assert_eq!(pareto_compare(&[1.0, 1.0], &[1.0, 1.0]), 0);
        // equal in one component, better in the other
        assert_eq!(pareto_compare(&[1.0, 1.0], &[1.0, 2.0]), -1);
    }

    #[test]
    fn test_pareto_compare_infinities() {
        assert_eq!(
            pareto_compare(&[f64::NEG_INFINITY, 0.0], &[f64::INFINITY, 0.0]),
            -1
        );
        assert_eq!(
            pareto_compare(&[f64::INFINITY, 0.0], &[f64::INFINITY, 0.0]),
            0
        );
    }

    #[test]
    fn test_pareto_front_single_objective() {
        let fmat = FitnessMatrix::from_rows([&[1.0][..], &[3.0], &[3.0], &[2.0]]);
        assert_eq!(pareto_front(&fmat), vec![1, 2]);
    }

    #[test]
    fn test_pareto_front_empty() {
        let fmat = FitnessMatrix::empty(2);
        assert!(pareto_front(&fmat).is_empty());
    }

    #[test]
    fn test_pareto_front_two_objectives() {
        // maximisation; the front is made of the points not dominated by any other
        let fmat = FitnessMatrix::from_rows([
            &[1.0, 8.0][..],
            &[2.0, 6.0],
            &[3.0, 4.0],
            &[2.0, 4.0], // dominated by row 1 and 2
            &[0.5, 0.5], // dominated by all
            &[4.0, 1.0],
        ]);
        assert_eq!(pareto_front(&fmat), vec![0, 1, 2, 5]);
    }

    #[test]
    /// Merging a Pareto set with an empty set keeps the set unchanged.
    fn test_merge_identity() {
        let a: Vec<&[f64]> = vec![&[1.0, 2.0], &[2.0, 1.0]];
        let empty: Vec<&[f64]> = vec![];

        let (left, right) = pareto_set_merge(&a, &empty);
        assert_eq!(left, vec![0, 1]);
        assert!(right.is_empty());

        let (left, right) = pareto_set_merge(&empty, &a);
        assert!(left.is_empty());
        assert_eq!(right, vec![0, 1]);
    }

    #[test]
    fn test_merge() {
        let left: Vec<&[f64]> = vec![&[1.0, 8.0], &[4.0, 4.0], &[8.0, 1.0]];
        let right: Vec<&[f64]> = vec![&[2.0, 8.0], &[3.0, 3.0], &[7.0, 0.5]];

        let (left_kept, right_kept) = pareto_set_merge(&left, &right);
        // [1.0, 8.0] is dominated by [2.0, 8.0]; [3.0, 3.0] by [4.0, 4.0]; [7.0, 0.5] by
        // [8.0, 1.0]
        assert_eq!(left_kept, vec![1, 2]);
        assert_eq!(right_kept, vec![0]);
    }
}
