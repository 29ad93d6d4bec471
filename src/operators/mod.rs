//! The interchangeable operator layer. Parent selection, population replacement, crossover and
//! mutation are all expressed as traits so the generational loop never needs to know the
//! concrete operator identities, and gene-type dispatch happens at compile time through the
//! encoding parameter.

pub use crossover::{
    ArithmeticCrossover, Crossover, EdgeCrossover, MixedCrossover, Order1Crossover,
    SimulatedBinaryCrossover, SinglePointCrossover, TwoPointCrossover, UniformCrossover,
};
pub use mutation::{
    BitFlipMutation, InversionMutation, MixedMutation, Mutation, PolynomialMutation,
    SwapMutation, UniformIntegerMutation, UniformRealMutation,
};
pub use replacement::{Elitism, KeepBest, KeepChildren, Replacement};
pub use selection::{Boltzmann, Rank, Roulette, Selection, SigmaScaling, Tournament};

mod crossover;
mod mutation;
mod replacement;
mod selection;
