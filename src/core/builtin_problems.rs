//! Built-in optimisation problems. These are mainly used to test the algorithms and to
//! demonstrate the library API; every fitness function is expressed for maximisation, with
//! minimised objectives negated.

use crate::core::{
    Bounds, BoundsSpec, Error, FitnessFunction, FitnessVector, IntegerEncoding,
    PermutationEncoding, Problem, RealEncoding,
};

/// Maximise `sin(x)`. With the domain `[0, pi]` the best candidate is at `x = pi / 2`.
#[derive(Debug)]
pub struct SinX;

impl FitnessFunction<RealEncoding> for SinX {
    fn evaluate(&self, chromosome: &Vec<f64>) -> FitnessVector {
        vec![chromosome[0].sin()]
    }
}

impl SinX {
    /// Create the problem with the domain `[0, pi]`.
    ///
    /// returns: `Result<Problem<RealEncoding, SinX>, Error>`
    pub fn create() -> Result<Problem<RealEncoding, SinX>, Error> {
        let encoding = RealEncoding::new(
            1,
            BoundsSpec::Uniform(Bounds::new(0.0, std::f64::consts::PI)?),
        )?;
        Ok(Problem::new(encoding, SinX))
    }
}

/// The two-objective Kursawe function.
///
/// Implemented based on:
/// > F. Kursawe. A variant of evolution strategies for vector optimization. In Parallel Problem
/// > Solving from Nature, volume 496 of Lecture Notes in Computer Science, pages 193-197, 1991.
///
/// Both objectives are minimised in the original formulation and are negated here.
#[derive(Debug)]
pub struct Kursawe {
    num_vars: usize,
}

impl FitnessFunction<RealEncoding> for Kursawe {
    fn evaluate(&self, chromosome: &Vec<f64>) -> FitnessVector {
        let f1: f64 = chromosome
            .windows(2)
            .map(|w| -10.0 * f64::exp(-0.2 * f64::sqrt(w[0] * w[0] + w[1] * w[1])))
            .sum();
        let f2: f64 = chromosome
            .iter()
            .map(|x| x.abs().powf(0.8) + 5.0 * f64::sin(x.powi(3)))
            .sum();
        vec![-f1, -f2]
    }
}

impl Kursawe {
    /// Create the problem with `num_vars` variables in the closed interval
    /// [`lower`, `upper`].
    ///
    /// # Arguments
    ///
    /// * `num_vars`: The number of variables. Must be at least 2.
    /// * `lower`: The lower bound of every variable.
    /// * `upper`: The upper bound of every variable.
    ///
    /// returns: `Result<Problem<RealEncoding, Kursawe>, Error>`
    pub fn create(
        num_vars: usize,
        lower: f64,
        upper: f64,
    ) -> Result<Problem<RealEncoding, Kursawe>, Error> {
        let encoding = RealEncoding::new(num_vars, BoundsSpec::Uniform(Bounds::new(lower, upper)?))?;
        Ok(Problem::new(encoding, Kursawe { num_vars }))
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }
}

/// Maximise `x^2 + y^2` on `[-1, 1]^2` subject to `x > 0` and `y > 0`, encoded as the violation
/// magnitudes `max(0, -x)` and `max(0, -y)`. The attached repair function flips the sign of the
/// violating variables, so the best solutions approach `(1, 1)`.
#[derive(Debug)]
pub struct ConstrainedSphere;

impl FitnessFunction<RealEncoding> for ConstrainedSphere {
    fn evaluate(&self, chromosome: &Vec<f64>) -> FitnessVector {
        vec![chromosome.iter().map(|x| x * x).sum()]
    }
}

impl ConstrainedSphere {
    /// Create the problem with the constraint and repair functions attached.
    ///
    /// returns: `Result<Problem<RealEncoding, ConstrainedSphere>, Error>`
    pub fn create() -> Result<Problem<RealEncoding, ConstrainedSphere>, Error> {
        let encoding = RealEncoding::new(2, BoundsSpec::Uniform(Bounds::new(-1.0, 1.0)?))?;
        let problem = Problem::new(encoding, ConstrainedSphere)
            .with_constraints(|chromosome: &Vec<f64>| {
                chromosome.iter().map(|x| f64::max(0.0, -x)).collect()
            })
            .with_repair(|candidate| {
                if candidate.chromosome.iter().any(|x| *x < 0.0) {
                    Some(candidate.chromosome.iter().map(|x| x.abs()).collect())
                } else {
                    None
                }
            });
        Ok(problem)
    }
}

/// Match an ASCII string with an integer-encoded chromosome. Every gene holds a printable
/// character as its ASCII code minus 32; the fitness is the number of matching positions.
#[derive(Debug)]
pub struct StringMatch {
    target: Vec<i64>,
}

impl FitnessFunction<IntegerEncoding> for StringMatch {
    fn evaluate(&self, chromosome: &Vec<i64>) -> FitnessVector {
        let matches = chromosome
            .iter()
            .zip(&self.target)
            .filter(|(gene, target)| gene == target)
            .count();
        vec![matches as f64]
    }
}

impl StringMatch {
    /// Create the problem for a target made of printable ASCII characters.
    ///
    /// # Arguments
    ///
    /// * `target`: The string to match.
    ///
    /// returns: `Result<Problem<IntegerEncoding, StringMatch>, Error>`
    pub fn create(target: &str) -> Result<Problem<IntegerEncoding, StringMatch>, Error> {
        let target: Vec<i64> = target.chars().map(|c| c as i64 - 32).collect();
        let encoding =
            IntegerEncoding::new(target.len(), BoundsSpec::Uniform(Bounds::new(0, 94)?))?;
        Ok(Problem::new(encoding, StringMatch { target }))
    }

    /// Decode a chromosome back into the matched string.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The chromosome to decode.
    ///
    /// returns: `String`
    pub fn decode(chromosome: &[i64]) -> String {
        chromosome
            .iter()
            .map(|gene| (*gene as u8 + 32) as char)
            .collect()
    }
}

/// The symmetric travelling salesman problem over the 52 Berlin locations of the TSPLIB
/// `berlin52` instance (optimal tour length 7542). The fitness is the negated length of the
/// cyclic tour.
#[derive(Debug)]
pub struct Tsp {
    cities: Vec<(f64, f64)>,
}

/// The city coordinates of the TSPLIB `berlin52` instance.
pub const BERLIN52: [(f64, f64); 52] = [
    (565.0, 575.0),
    (25.0, 185.0),
    (345.0, 750.0),
    (945.0, 685.0),
    (845.0, 655.0),
    (880.0, 660.0),
    (25.0, 230.0),
    (525.0, 1000.0),
    (580.0, 1175.0),
    (650.0, 1130.0),
    (1605.0, 620.0),
    (1220.0, 580.0),
    (1465.0, 200.0),
    (1530.0, 5.0),
    (845.0, 680.0),
    (725.0, 370.0),
    (145.0, 665.0),
    (415.0, 635.0),
    (510.0, 875.0),
    (560.0, 365.0),
    (300.0, 465.0),
    (520.0, 585.0),
    (480.0, 415.0),
    (835.0, 625.0),
    (975.0, 580.0),
    (1215.0, 245.0),
    (1320.0, 315.0),
    (1250.0, 400.0),
    (660.0, 180.0),
    (410.0, 250.0),
    (420.0, 555.0),
    (575.0, 665.0),
    (1150.0, 1160.0),
    (700.0, 580.0),
    (685.0, 595.0),
    (685.0, 610.0),
    (770.0, 610.0),
    (795.0, 645.0),
    (720.0, 635.0),
    (760.0, 650.0),
    (475.0, 960.0),
    (95.0, 260.0),
    (875.0, 920.0),
    (700.0, 500.0),
    (555.0, 815.0),
    (830.0, 485.0),
    (1170.0, 65.0),
    (830.0, 610.0),
    (605.0, 625.0),
    (595.0, 360.0),
    (1340.0, 725.0),
    (1740.0, 245.0),
];

impl FitnessFunction<PermutationEncoding> for Tsp {
    fn evaluate(&self, chromosome: &Vec<usize>) -> FitnessVector {
        vec![-self.tour_length(chromosome)]
    }
}

impl Tsp {
    /// Create the `berlin52` instance.
    ///
    /// returns: `Result<Problem<PermutationEncoding, Tsp>, Error>`
    pub fn create() -> Result<Problem<PermutationEncoding, Tsp>, Error> {
        Self::with_cities(BERLIN52.to_vec())
    }

    /// Create an instance over custom city coordinates.
    ///
    /// # Arguments
    ///
    /// * `cities`: The city coordinates.
    ///
    /// returns: `Result<Problem<PermutationEncoding, Tsp>, Error>`
    pub fn with_cities(cities: Vec<(f64, f64)>) -> Result<Problem<PermutationEncoding, Tsp>, Error> {
        let encoding = PermutationEncoding::new(cities.len())?;
        Ok(Problem::new(encoding, Tsp { cities }))
    }

    /// The length of the cyclic tour visiting the cities in chromosome order.
    ///
    /// # Arguments
    ///
    /// * `chromosome`: The tour.
    ///
    /// returns: `f64`
    pub fn tour_length(&self, chromosome: &[usize]) -> f64 {
        let mut length = 0.0;
        for i in 0..chromosome.len() {
            let (x1, y1) = self.cities[chromosome[i]];
            let (x2, y2) = self.cities[chromosome[(i + 1) % chromosome.len()]];
            length += f64::hypot(x2 - x1, y2 - y1);
        }
        length
    }
}

/// The scalable DTLZ1 problem.
///
/// Implemented based on:
/// > K. Deb, L. Thiele, M. Laumanns and E. Zitzler. Scalable test problems for evolutionary
/// > multiobjective optimization. In Evolutionary Multiobjective Optimization, pages 105-145,
/// > 2005.
///
/// The objectives are minimised in the original formulation and are negated here. At the
/// optimum the minimised objective values sum to 0.5.
#[derive(Debug)]
pub struct Dtlz1 {
    num_vars: usize,
    num_objectives: usize,
}

impl FitnessFunction<RealEncoding> for Dtlz1 {
    fn evaluate(&self, chromosome: &Vec<f64>) -> FitnessVector {
        let k = self.num_vars - self.num_objectives + 1;
        let g: f64 = 100.0
            * (k as f64
                + chromosome[self.num_vars - k..]
                    .iter()
                    .map(|x| (x - 0.5).powi(2) - f64::cos(20.0 * std::f64::consts::PI * (x - 0.5)))
                    .sum::<f64>());

        let mut fitness = Vec::with_capacity(self.num_objectives);
        for m in 0..self.num_objectives {
            let mut f = 0.5 * (1.0 + g);
            for x in &chromosome[..self.num_objectives - 1 - m] {
                f *= x;
            }
            if m > 0 {
                f *= 1.0 - chromosome[self.num_objectives - 1 - m];
            }
            fitness.push(-f);
        }
        fitness
    }
}

impl Dtlz1 {
    /// Create the problem.
    ///
    /// # Arguments
    ///
    /// * `num_vars`: The number of variables.
    /// * `num_objectives`: The number of objectives. Must not exceed `num_vars`.
    ///
    /// returns: `Result<Problem<RealEncoding, Dtlz1>, Error>`
    pub fn create(
        num_vars: usize,
        num_objectives: usize,
    ) -> Result<Problem<RealEncoding, Dtlz1>, Error> {
        let encoding = RealEncoding::new(num_vars, BoundsSpec::Uniform(Bounds::new(0.0, 1.0)?))?;
        Ok(Problem::new(
            encoding,
            Dtlz1 {
                num_vars,
                num_objectives,
            },
        ))
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::core::FitnessFunction;

    use super::*;

    #[test]
    fn test_sin_x() {
        let problem = SinX::create().unwrap();
        let fitness = problem
            .fitness_function
            .evaluate(&vec![std::f64::consts::FRAC_PI_2]);
        assert_approx_eq!(f64, fitness[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_string_match_round_trip() {
        let problem = StringMatch::create("HELLO WORLD!").unwrap();
        let encoded: Vec<i64> = "HELLO WORLD!".chars().map(|c| c as i64 - 32).collect();
        let fitness = problem.fitness_function.evaluate(&encoded);
        assert_eq!(fitness[0], 12.0);
        assert_eq!(StringMatch::decode(&encoded), "HELLO WORLD!");
    }

    #[test]
    fn test_constrained_sphere_repair() {
        let problem = ConstrainedSphere::create().unwrap();
        let constraints = problem.constraints.as_ref().unwrap();

        // a violating candidate has positive violation magnitudes
        let violations = constraints(&vec![-0.5, 0.5]);
        assert_eq!(violations, vec![0.5, 0.0]);

        let repair = problem.repair.as_ref().unwrap();
        let mut candidate = crate::core::Candidate::new(vec![-0.5, 0.5]);
        candidate.set_evaluation(vec![0.5], violations);
        assert_eq!(repair(&candidate).unwrap(), vec![0.5, 0.5]);

        // a feasible candidate is left untouched
        let mut feasible = crate::core::Candidate::new(vec![0.5, 0.5]);
        feasible.set_evaluation(vec![0.5], vec![0.0, 0.0]);
        assert!(repair(&feasible).is_none());
    }

    #[test]
    fn test_tsp_tour_length() {
        let problem = Tsp::with_cities(vec![(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)]).unwrap();
        let length = problem.fitness_function.tour_length(&[0, 1, 2]);
        assert_approx_eq!(f64, length, 3.0 + 4.0 + 5.0, epsilon = 1e-12);
        assert_eq!(problem.fitness_function.evaluate(&vec![0, 1, 2])[0], -12.0);
    }

    #[test]
    /// At an optimal DTLZ1 point the minimised objectives sum to 0.5.
    fn test_dtlz1_optimum() {
        let problem = Dtlz1::create(7, 3).unwrap();
        // the distance variables at 0.5 make g = 0
        let chromosome = vec![0.3, 0.7, 0.5, 0.5, 0.5, 0.5, 0.5];
        let fitness = problem.fitness_function.evaluate(&chromosome);
        let sum: f64 = fitness.iter().map(|f| -f).sum();
        assert_approx_eq!(f64, sum, 0.5, epsilon = 1e-9);
    }
}
