use std::any::Any;

use log::warn;

use crate::core::{FitnessVector, GaInfo};
use crate::metrics::Metric;
use crate::utils::{elementwise_min, hypervolume, volume_between};

/// Record the exact hypervolume dominated by the population with respect to a fixed reference
/// point for every generation. The reference point must be dominated by every fitness vector
/// the run produces; generations where it is not are recorded as `NaN`.
#[derive(Debug)]
pub struct Hypervolume {
    reference_point: FitnessVector,
    data: Vec<f64>,
}

impl Hypervolume {
    /// Create the metric with the reference point used in the hypervolume calculation.
    ///
    /// # Arguments
    ///
    /// * `reference_point`: The reference point coordinates.
    ///
    /// returns: `Hypervolume`
    pub fn new(reference_point: FitnessVector) -> Self {
        Self {
            reference_point,
            data: Vec::new(),
        }
    }

    /// The hypervolume of the given generation.
    pub fn value_at(&self, generation: usize) -> f64 {
        self.data[generation]
    }

    /// The hypervolumes of all generations so far.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

impl Metric for Hypervolume {
    fn name(&self) -> &'static str {
        "Hypervolume"
    }

    fn initialize(&mut self, ga: &GaInfo) {
        debug_assert_eq!(self.reference_point.len(), ga.num_objectives);
        self.data.clear();
        self.data.reserve(ga.max_generations + 1);
    }

    fn update(&mut self, ga: &GaInfo) {
        let value = match hypervolume(ga.fitness_matrix, &self.reference_point) {
            Ok(value) => value,
            Err(e) => {
                warn!("cannot calculate the hypervolume of generation {}: {e}", ga.generation);
                f64::NAN
            }
        };
        self.data.push(value);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Record the exact hypervolume of every generation against an automatically tracked reference
/// point: the component-wise minimum of every fitness vector seen during the run.
///
/// When a new generation moves the worst point, the hypervolumes recorded for the earlier
/// generations are corrected retroactively, so that at any time all recorded values are
/// relative to the same reference point. The correction subtracts the volume between the
/// generation's ideal point and the old worst point and adds the volume between the ideal point
/// and the new one.
#[derive(Debug, Default)]
pub struct AutoHypervolume {
    data: Vec<f64>,
    /// The ideal point of each recorded generation, needed for the retroactive correction.
    ideal_points: Vec<FitnessVector>,
    /// The running component-wise minimum of every fitness vector seen in the run.
    worst_point: FitnessVector,
}

impl AutoHypervolume {
    pub fn new() -> Self {
        Self::default()
    }

    /// The hypervolume of the given generation.
    pub fn value_at(&self, generation: usize) -> f64 {
        self.data[generation]
    }

    /// The hypervolumes of all generations so far, relative to the current worst point.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The reference point the recorded hypervolumes are relative to.
    pub fn worst_point(&self) -> &[f64] {
        &self.worst_point
    }
}

impl Metric for AutoHypervolume {
    fn name(&self) -> &'static str {
        "AutoHypervolume"
    }

    fn initialize(&mut self, ga: &GaInfo) {
        self.data.clear();
        self.data.reserve(ga.max_generations + 1);
        self.ideal_points.clear();
        self.worst_point = vec![f64::INFINITY; ga.num_objectives];
    }

    fn update(&mut self, ga: &GaInfo) {
        let fmat = ga.fitness_matrix;
        let worst = fmat.min_fitness();
        let ideal = fmat.max_fitness();

        let new_worst = elementwise_min(&self.worst_point, &worst);
        let previous_worst = std::mem::replace(&mut self.worst_point, new_worst);

        // a shift of the global worst point grows the dominated region of every earlier
        // generation by the volume between its ideal point and the two reference points
        if self.worst_point != previous_worst {
            for (value, ideal_point) in self.data.iter_mut().zip(&self.ideal_points) {
                let old_volume = volume_between(ideal_point, &previous_worst);
                let new_volume = volume_between(ideal_point, &self.worst_point);
                *value += new_volume - old_volume;
            }
        }

        let value = match hypervolume(fmat, &self.worst_point) {
            Ok(value) => value,
            Err(e) => {
                warn!("cannot calculate the hypervolume of generation {}: {e}", ga.generation);
                f64::NAN
            }
        };
        self.data.push(value);
        self.ideal_points.push(ideal);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
