pub use algebra::{
    dot_product, euclidean_distance_sq, mean, normalise_vector, perpendicular_distance_sq,
    std_dev, vector_magnitude, volume_between,
};
pub use floats::{
    float_compare, float_is_equal, float_is_greater, float_is_less, float_is_less_eq,
    float_vec_is_equal, ScopedTolerances, Tolerances,
};
pub use hypervolume::hypervolume;
pub use nd_sort::{fast_non_dominated_sort, NonDominatedSortResults};
pub use pareto::{pareto_compare, pareto_dominated, pareto_front, pareto_set_merge};
pub use qrng::QuasiRandom;
pub use reference_points::{quasirandom_simplex_points, reference_directions, DasDarren1998};
pub use vectors::{
    argmax, argmin, argsort, elementwise_max, elementwise_min, vector_max, vector_min, Sort,
};

mod algebra;
mod floats;
mod hypervolume;
mod nd_sort;
mod pareto;
mod qrng;
mod reference_points;
mod vectors;
