use crate::core::FitnessMatrix;
use crate::utils::pareto::pareto_compare;

/// Outputs of the non-dominated sort algorithm.
#[derive(Debug)]
pub struct NonDominatedSortResults {
    /// A vector containing sub-vectors. Each child vector represents a front (the first being
    /// the non-dominated front of rank 0) and contains the matrix row indices belonging to that
    /// front. Fronts are ordered by ascending rank.
    pub fronts: Vec<Vec<usize>>,
    /// The Pareto rank assigned to each matrix row. Rank 0 is the non-dominated set; removing it
    /// and re-sorting the rest yields rank 1, and so on.
    pub ranks: Vec<usize>,
}

/// Non-dominated fast sorting from the NSGA2 paper (with complexity `O(M * N^2)`, where `M` is
/// the number of objectives and `N` the number of candidates).
///
/// This sorts candidates into fronts based on the number of candidates that dominate them.
/// Candidates that are not dominated by any other belong to the first front. Every pair of rows
/// is compared exactly once with the tolerant Pareto comparison.
///
/// Implemented based on paragraph 3A in:
/// > K. Deb, A. Pratap, S. Agarwal and T. Meyarivan, "A fast and elitist multi-objective genetic
/// > algorithm: NSGA-II," in IEEE Transactions on Evolutionary Computation, vol. 6, no. 2, pp.
/// > 182-197, April 2002, doi: 10.1109/4235.996017.
///
/// # Arguments
///
/// * `fmat`: The fitness matrix with the candidates to sort by dominance.
/// * `first_front_only`: Stop after the rank-0 front has been identified. The ranks of the
///   remaining candidates are left at `usize::MAX`.
///
/// returns: `NonDominatedSortResults`. An empty matrix yields empty results.
pub fn fast_non_dominated_sort(
    fmat: &FitnessMatrix,
    first_front_only: bool,
) -> NonDominatedSortResults {
    let n = fmat.nrows();
    if n == 0 {
        return NonDominatedSortResults {
            fronts: Vec::new(),
            ranks: Vec::new(),
        };
    }

    // the rows dominated by each row. This is S_p in the paper
    let mut dominated_rows: Vec<Vec<usize>> = vec![Vec::new(); n];
    // the number of rows dominating each row. This is n_p in the paper
    let mut domination_counter: Vec<usize> = vec![0; n];
    let mut ranks: Vec<usize> = vec![usize::MAX; n];

    let mut current_front: Vec<usize> = Vec::new();
    for p in 0..n {
        for q in (p + 1)..n {
            match pareto_compare(fmat.row(p), fmat.row(q)) {
                1 => {
                    // `p` dominates `q`
                    dominated_rows[p].push(q);
                    domination_counter[q] += 1;
                }
                -1 => {
                    // `q` dominates `p`
                    dominated_rows[q].push(p);
                    domination_counter[p] += 1;
                }
                _ => {}
            }
        }
    }
    for p in 0..n {
        if domination_counter[p] == 0 {
            ranks[p] = 0;
            current_front.push(p);
        }
    }

    let mut fronts = vec![current_front];
    if first_front_only {
        return NonDominatedSortResults { fronts, ranks };
    }

    // peel off the remaining fronts: removing a front decrements the domination counter of the
    // rows it dominates, and rows reaching a zero counter form the next front
    let mut rank = 0;
    loop {
        let mut next_front: Vec<usize> = Vec::new();
        for p in fronts.last().unwrap() {
            for q in &dominated_rows[*p] {
                domination_counter[*q] -= 1;
                if domination_counter[*q] == 0 {
                    ranks[*q] = rank + 1;
                    next_front.push(*q);
                }
            }
        }
        rank += 1;

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    NonDominatedSortResults { fronts, ranks }
}

#[cfg(test)]
mod test {
    use crate::core::FitnessMatrix;
    use crate::utils::pareto_front;

    use super::fast_non_dominated_sort;

    /// Objective values of eleven points, negated for maximisation. The fronts were calculated
    /// manually by plotting the points.
    fn fixture() -> FitnessMatrix {
        let objectives: Vec<[f64; 2]> = vec![
            [1.1, 8.1],
            [2.1, 6.1],
            [3.1, 4.1],
            [3.1, 7.1],
            [5.1, 3.1],
            [5.1, 5.1],
            [7.1, 7.1],
            [8.1, 2.1],
            [10.1, 6.1],
            [11.1, 1.1],
            [11.1, 3.1],
        ];
        // negate so that the points keep the same dominance structure under maximisation
        let rows: Vec<Vec<f64>> = objectives.iter().map(|o| vec![-o[0], -o[1]]).collect();
        FitnessMatrix::from_rows(rows.iter().map(|r| r.as_slice()))
    }

    #[test]
    fn test_sorting_2obj() {
        let fmat = fixture();
        let result = fast_non_dominated_sort(&fmat, false);

        let expected_fronts: Vec<Vec<usize>> = vec![
            vec![0, 1, 2, 4, 7, 9],
            vec![3, 5, 10],
            vec![6, 8],
        ];
        assert_eq!(result.fronts, expected_fronts);

        for (rank, front) in expected_fronts.iter().enumerate() {
            for idx in front {
                assert_eq!(result.ranks[*idx], rank);
            }
        }
    }

    #[test]
    /// Rank 0 of the non-dominated sort is exactly the Pareto front of the matrix.
    fn test_rank_zero_is_pareto_front() {
        let fmat = fixture();
        let result = fast_non_dominated_sort(&fmat, false);

        let mut rank_zero = result.fronts[0].clone();
        rank_zero.sort_unstable();
        assert_eq!(rank_zero, pareto_front(&fmat));
    }

    #[test]
    fn test_first_front_only() {
        let fmat = fixture();
        let result = fast_non_dominated_sort(&fmat, true);
        assert_eq!(result.fronts.len(), 1);
        assert_eq!(result.fronts[0], vec![0, 1, 2, 4, 7, 9]);
    }

    #[test]
    fn test_single_row() {
        let fmat = FitnessMatrix::from_rows([&[1.0, 2.0][..]]);
        let result = fast_non_dominated_sort(&fmat, false);
        assert_eq!(result.fronts, vec![vec![0]]);
        assert_eq!(result.ranks, vec![0]);
    }

    #[test]
    fn test_empty_matrix() {
        let fmat = FitnessMatrix::empty(2);
        let result = fast_non_dominated_sort(&fmat, false);
        assert!(result.fronts.is_empty());
        assert!(result.ranks.is_empty());
    }
}
