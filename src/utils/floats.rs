use std::cmp::Ordering;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering as MemOrdering};

/// The process-wide absolute tolerance used for floating-point comparisons, stored as raw `f64`
/// bits so that it can be updated atomically.
static ABSOLUTE_TOLERANCE: AtomicU64 = AtomicU64::new(0x3D719799812DEA11); // 1e-12
/// The process-wide relative tolerance used for floating-point comparisons, expressed as a
/// number of machine epsilons.
static RELATIVE_TOLERANCE_EPSILONS: AtomicU32 = AtomicU32::new(10);

/// The global absolute and relative tolerance values used when comparing floating-point values
/// throughout the library. New tolerances can be set for a limited scope using
/// [`ScopedTolerances`].
pub struct Tolerances;

impl Tolerances {
    /// Get the current absolute tolerance used for floating-point comparisons.
    ///
    /// return: `f64`
    pub fn abs() -> f64 {
        f64::from_bits(ABSOLUTE_TOLERANCE.load(MemOrdering::Acquire))
    }

    /// Get the current relative tolerance used for floating-point comparisons. This is the
    /// configured number of epsilons multiplied by the machine epsilon.
    ///
    /// return: `f64`
    pub fn eps() -> f64 {
        RELATIVE_TOLERANCE_EPSILONS.load(MemOrdering::Acquire) as f64 * f64::EPSILON
    }

    /// Set the absolute tolerance used for floating-point comparisons. This is a process-wide
    /// setting.
    ///
    /// # Arguments
    ///
    /// * `abs`: The new absolute tolerance.
    pub fn set_abs(abs: f64) -> f64 {
        f64::from_bits(ABSOLUTE_TOLERANCE.swap(abs.to_bits(), MemOrdering::AcqRel))
    }

    /// Set the relative tolerance used for floating-point comparisons as a number of machine
    /// epsilons. This is a process-wide setting.
    ///
    /// # Arguments
    ///
    /// * `num_epsilons`: The new number of epsilons.
    pub fn set_eps(num_epsilons: u32) -> u32 {
        RELATIVE_TOLERANCE_EPSILONS.swap(num_epsilons, MemOrdering::AcqRel)
    }
}

/// Override the process-wide comparison tolerances for the lifetime of this value. The old
/// tolerances are restored when the instance is dropped.
///
/// # Example
/// ```
/// use evoxide::utils::{ScopedTolerances, Tolerances};
///
/// let guard = ScopedTolerances::new(4, 1e-8);
/// assert_eq!(Tolerances::abs(), 1e-8);
/// drop(guard);
/// assert_eq!(Tolerances::abs(), 1e-12);
/// ```
#[must_use]
pub struct ScopedTolerances {
    old_abs: f64,
    old_eps: u32,
}

impl ScopedTolerances {
    /// Set new tolerance values that will be used until the returned guard is dropped.
    ///
    /// # Arguments
    ///
    /// * `num_epsilons`: The number of epsilons to use as the relative tolerance.
    /// * `abs`: The absolute tolerance value.
    ///
    /// returns: `ScopedTolerances`
    pub fn new(num_epsilons: u32, abs: f64) -> Self {
        Self {
            old_abs: Tolerances::set_abs(abs),
            old_eps: Tolerances::set_eps(num_epsilons),
        }
    }
}

impl Drop for ScopedTolerances {
    fn drop(&mut self) {
        Tolerances::set_abs(self.old_abs);
        Tolerances::set_eps(self.old_eps);
    }
}

/// Calculate the tolerance used to compare `lhs` and `rhs`. The tolerance scales with the
/// magnitude of the compared values but never drops below the absolute tolerance.
fn comparison_tolerance(lhs: f64, rhs: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).min(f64::MAX);
    f64::max(scale * Tolerances::eps(), Tolerances::abs())
}

/// Compare two floating point numbers using the process-wide tolerances. Values closer than the
/// tolerance are considered equal. Infinities compare by their raw ordering.
///
/// # Arguments
///
/// * `lhs`: The left operand.
/// * `rhs`: The right operand.
///
/// returns: `Ordering`
pub fn float_compare(lhs: f64, rhs: f64) -> Ordering {
    debug_assert!(!lhs.is_nan() && !rhs.is_nan());

    if lhs.abs().max(rhs.abs()) == f64::INFINITY {
        return lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal);
    }

    let diff = lhs - rhs;
    let tol = comparison_tolerance(lhs, rhs);
    if diff > tol {
        Ordering::Greater
    } else if diff < -tol {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Return `true` if `lhs` is approximately equal to `rhs` under the process-wide tolerances.
pub fn float_is_equal(lhs: f64, rhs: f64) -> bool {
    float_compare(lhs, rhs) == Ordering::Equal
}

/// Return `true` if `lhs` is definitely less than `rhs` under the process-wide tolerances.
pub fn float_is_less(lhs: f64, rhs: f64) -> bool {
    float_compare(lhs, rhs) == Ordering::Less
}

/// Return `true` if `lhs` is less than or approximately equal to `rhs`.
pub fn float_is_less_eq(lhs: f64, rhs: f64) -> bool {
    float_compare(lhs, rhs) != Ordering::Greater
}

/// Return `true` if `lhs` is definitely greater than `rhs` under the process-wide tolerances.
pub fn float_is_greater(lhs: f64, rhs: f64) -> bool {
    float_compare(lhs, rhs) == Ordering::Greater
}

/// Return `true` if the two vectors are element-wise approximately equal.
///
/// # Arguments
///
/// * `lhs`: The first vector.
/// * `rhs`: The second vector.
///
/// returns: `bool`
pub fn float_vec_is_equal(lhs: &[f64], rhs: &[f64]) -> bool {
    lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| float_is_equal(*a, *b))
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use super::{
        float_compare, float_is_equal, float_is_less, float_vec_is_equal, ScopedTolerances,
        Tolerances,
    };

    #[test]
    /// The default tolerances are restored when the scoped guard is dropped.
    fn test_scoped_tolerances() {
        assert_eq!(Tolerances::abs(), 1e-12);

        {
            let _guard = ScopedTolerances::new(2, 0.1);
            assert_eq!(Tolerances::abs(), 0.1);
            assert_eq!(Tolerances::eps(), 2.0 * f64::EPSILON);

            // values within the new absolute tolerance compare as equal
            assert!(float_is_equal(1.0, 1.05));
        }

        assert_eq!(Tolerances::abs(), 1e-12);
        assert!(!float_is_equal(1.0, 1.05));
    }

    #[test]
    fn test_float_compare() {
        assert_eq!(float_compare(1.0, 1.0), Ordering::Equal);
        assert_eq!(float_compare(1.0, 1.0 + f64::EPSILON), Ordering::Equal);
        assert_eq!(float_compare(1.0, 2.0), Ordering::Less);
        assert_eq!(float_compare(2.0, 1.0), Ordering::Greater);
        assert!(float_is_less(-1.0, 0.0));
    }

    #[test]
    /// Infinite values compare by their raw ordering.
    fn test_float_compare_infinities() {
        assert_eq!(
            float_compare(f64::INFINITY, f64::INFINITY),
            Ordering::Equal
        );
        assert_eq!(
            float_compare(f64::NEG_INFINITY, f64::INFINITY),
            Ordering::Less
        );
        assert_eq!(float_compare(f64::INFINITY, 1.0), Ordering::Greater);
        assert_eq!(float_compare(1.0, f64::INFINITY), Ordering::Less);
    }

    #[test]
    fn test_float_vec_is_equal() {
        assert!(float_vec_is_equal(&[1.0, 2.0], &[1.0, 2.0]));
        assert!(!float_vec_is_equal(&[1.0, 2.0], &[1.0, 2.5]));
        assert!(!float_vec_is_equal(&[1.0, 2.0], &[1.0]));
    }
}
