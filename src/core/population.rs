use std::ops::RangeBounds;

use crate::core::{Candidate, Encoding, FitnessVector};
use crate::utils::{mean, std_dev};

/// The population with the candidate solutions.
#[derive(Clone, Debug, Default)]
pub struct Population<E: Encoding>(pub Vec<Candidate<E>>);

impl<E: Encoding> Population<E> {
    /// Initialise a population with no candidates.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Initialise a population with some candidates.
    ///
    /// # Arguments
    ///
    /// * `candidates`: The vector of candidates to add.
    ///
    /// returns: `Population<E>`
    pub fn new_with(candidates: Vec<Candidate<E>>) -> Self {
        Self(candidates)
    }

    /// Get the population size.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the population candidates.
    pub fn candidates(&self) -> &[Candidate<E>] {
        &self.0
    }

    /// Borrow the population candidates as a mutable slice.
    pub fn candidates_mut(&mut self) -> &mut [Candidate<E>] {
        &mut self.0
    }

    /// Get a population candidate by its index.
    pub fn candidate(&self, index: usize) -> Option<&Candidate<E>> {
        self.0.get(index)
    }

    /// Add a new candidate to the population.
    pub fn add_candidate(&mut self, candidate: Candidate<E>) {
        self.0.push(candidate);
    }

    /// Add new candidates to the population.
    pub fn add_candidates(&mut self, candidates: Vec<Candidate<E>>) {
        self.0.extend(candidates);
    }

    /// Remove the specified range from the population in bulk and return the removed candidates.
    ///
    /// # Arguments
    ///
    /// * `range_to_remove`: The range to remove.
    ///
    /// returns: `Vec<Candidate<E>>`
    pub fn drain<R>(&mut self, range_to_remove: R) -> Vec<Candidate<E>>
    where
        R: RangeBounds<usize>,
    {
        self.0.drain(range_to_remove).collect()
    }
}

/// A dense row-major matrix with the fitness vectors of multiple candidates. Row `i` holds the
/// fitness vector of the candidate at index `i`, so the size of the matrix is
/// `number_of_candidates x number_of_objectives`. The matrix is rebuilt from the population once
/// per generation, after the replacement step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitnessMatrix {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl FitnessMatrix {
    /// Create an empty matrix with the given number of objectives.
    pub fn empty(num_objectives: usize) -> Self {
        Self {
            data: Vec::new(),
            nrows: 0,
            ncols: num_objectives,
        }
    }

    /// Build the matrix from the evaluated candidates of a population.
    ///
    /// # Arguments
    ///
    /// * `population`: The population. All candidates must be evaluated and share the same
    ///    number of objectives.
    ///
    /// returns: `FitnessMatrix`
    pub fn from_population<E: Encoding>(population: &Population<E>) -> Self {
        Self::from_rows(population.candidates().iter().map(|c| c.fitness()))
    }

    /// Build the matrix from an iterator of fitness rows.
    ///
    /// # Arguments
    ///
    /// * `rows`: The fitness vectors. All rows must have the same length.
    ///
    /// returns: `FitnessMatrix`
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut data = Vec::new();
        let mut nrows = 0;
        let mut ncols = 0;
        for row in rows {
            debug_assert!(nrows == 0 || row.len() == ncols);
            ncols = row.len();
            data.extend_from_slice(row);
            nrows += 1;
        }
        Self { data, nrows, ncols }
    }

    /// Append a fitness row to the matrix.
    pub fn append_row(&mut self, row: &[f64]) {
        debug_assert!(self.nrows == 0 || row.len() == self.ncols);
        self.ncols = row.len();
        self.data.extend_from_slice(row);
        self.nrows += 1;
    }

    /// The number of candidates.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// The number of objectives.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Return `true` when the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }

    /// Get the fitness vector of the candidate at `index`.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.ncols..(index + 1) * self.ncols]
    }

    /// Iterate over the fitness rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.nrows).map(move |i| self.row(i))
    }

    /// Calculate the minimum fitness value of each objective across all candidates.
    ///
    /// return: `FitnessVector`
    pub fn min_fitness(&self) -> FitnessVector {
        self.fold_columns(f64::INFINITY, f64::min)
    }

    /// Calculate the maximum fitness value of each objective across all candidates.
    ///
    /// return: `FitnessVector`
    pub fn max_fitness(&self) -> FitnessVector {
        self.fold_columns(f64::NEG_INFINITY, f64::max)
    }

    /// Calculate the mean fitness value of each objective across all candidates.
    ///
    /// return: `FitnessVector`
    pub fn mean_fitness(&self) -> FitnessVector {
        (0..self.ncols).map(|j| mean(&self.column(j))).collect()
    }

    /// Calculate the sample standard deviation of each objective across all candidates.
    ///
    /// return: `FitnessVector`
    pub fn std_dev_fitness(&self) -> FitnessVector {
        (0..self.ncols)
            .map(|j| {
                let column = self.column(j);
                std_dev(&column, mean(&column))
            })
            .collect()
    }

    /// Get a copy of the values of the objective at `index` for all candidates.
    ///
    /// # Arguments
    ///
    /// * `index`: The objective index.
    ///
    /// returns: `Vec<f64>`
    pub fn column(&self, index: usize) -> Vec<f64> {
        debug_assert!(index < self.ncols);
        (0..self.nrows).map(|i| self.row(i)[index]).collect()
    }

    fn fold_columns(&self, init: f64, f: impl Fn(f64, f64) -> f64) -> FitnessVector {
        let mut result = vec![init; self.ncols];
        for row in self.rows() {
            for (acc, value) in result.iter_mut().zip(row) {
                *acc = f(*acc, *value);
            }
        }
        result
    }
}
