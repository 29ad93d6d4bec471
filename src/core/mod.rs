pub use candidate::{Candidate, FitnessVector};
pub use encoding::{
    BinaryEncoding, Bounds, BoundsSpec, Encoding, IntegerEncoding, MixedEncoding,
    PermutationEncoding, RealEncoding, VectorEncoding,
};
pub use error::Error;
pub use ga_info::GaInfo;
pub use population::{FitnessMatrix, Population};
pub use problem::{ConstraintsFn, FitnessFunction, Problem, RepairFn};

mod candidate;
mod encoding;
mod error;
mod ga_info;
mod population;
mod problem;

pub mod builtin_problems;
