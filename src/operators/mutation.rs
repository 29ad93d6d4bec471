use rand::{Rng, RngCore};

use crate::core::{
    BinaryEncoding, Encoding, Error, IntegerEncoding, MixedEncoding, PermutationEncoding,
    RealEncoding,
};

/// The trait to implement a mutation operator. The engine applies the operator to every child;
/// the operator decides internally, per gene or per chromosome, whether and how to mutate under
/// the configured mutation rate.
pub trait Mutation<E: Encoding>: Send + Sync {
    /// Mutate a chromosome in place.
    ///
    /// # Arguments
    ///
    /// * `encoding`: The encoding of the chromosome.
    /// * `chromosome`: The chromosome to mutate.
    /// * `rate`: The mutation rate in the closed interval [0, 1].
    /// * `rng`: The random number generator.
    ///
    /// returns: `bool`. `true` when any gene changed, so the caller can invalidate the fitness
    /// of the candidate.
    fn mutate(
        &self,
        encoding: &E,
        chromosome: &mut E::Chromosome,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool;
}

/// Bit-flip mutation for binary chromosomes. Every gene is flipped with a probability equal to
/// the mutation rate.
#[derive(Debug, Default)]
pub struct BitFlipMutation;

impl Mutation<BinaryEncoding> for BitFlipMutation {
    fn mutate(
        &self,
        _encoding: &BinaryEncoding,
        chromosome: &mut Vec<bool>,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut changed = false;
        for gene in chromosome.iter_mut() {
            if rng.gen::<f64>() < rate {
                *gene = !*gene;
                changed = true;
            }
        }
        changed
    }
}

/// The Polynomial Mutation (PM) operator for real-coded chromosomes.
///
/// Implemented based on:
/// > K. Deb and D. Deb. Analysing mutation schemes for real-parameter genetic algorithms.
/// > International Journal of Artificial Intelligence and Soft Computing, 4(1):1-28, 2014.
///
/// Every gene is mutated with a probability equal to the mutation rate. The mutated value stays
/// within the gene bounds; a large index parameter keeps it close to the original value.
#[derive(Debug)]
pub struct PolynomialMutation {
    /// The index parameter (eta_m). Suggested values are in the [20, 100] range.
    index_parameter: f64,
}

impl PolynomialMutation {
    /// Create the PM operator. This returns an error if the index parameter is negative.
    ///
    /// # Arguments
    ///
    /// * `index_parameter`: The index parameter (eta_m).
    ///
    /// returns: `Result<PolynomialMutation, Error>`
    pub fn new(index_parameter: f64) -> Result<Self, Error> {
        if index_parameter < 0.0 {
            return Err(Error::MutationOperator(
                "PolynomialMutation".to_string(),
                format!("the index parameter ({}) must not be negative", index_parameter),
            ));
        }
        Ok(Self { index_parameter })
    }
}

impl Default for PolynomialMutation {
    fn default() -> Self {
        Self {
            index_parameter: 20.0,
        }
    }
}

impl Mutation<RealEncoding> for PolynomialMutation {
    fn mutate(
        &self,
        encoding: &RealEncoding,
        chromosome: &mut Vec<f64>,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut changed = false;
        for (i, gene) in chromosome.iter_mut().enumerate() {
            if rng.gen::<f64>() >= rate {
                continue;
            }
            let bounds = encoding.bounds(i);
            let range = bounds.upper() - bounds.lower();
            if range <= 0.0 {
                continue;
            }

            let u = rng.gen::<f64>();
            let exponent = 1.0 / (self.index_parameter + 1.0);
            let delta = if u < 0.5 {
                (2.0 * u).powf(exponent) - 1.0
            } else {
                1.0 - (2.0 * (1.0 - u)).powf(exponent)
            };

            *gene = (*gene + delta * range).clamp(bounds.lower(), bounds.upper());
            changed = true;
        }
        changed
    }
}

/// Uniform-reset mutation for real-coded chromosomes. Every gene is replaced by a uniform draw
/// from its bounds with a probability equal to the mutation rate.
#[derive(Debug, Default)]
pub struct UniformRealMutation;

impl Mutation<RealEncoding> for UniformRealMutation {
    fn mutate(
        &self,
        encoding: &RealEncoding,
        chromosome: &mut Vec<f64>,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut changed = false;
        for (i, gene) in chromosome.iter_mut().enumerate() {
            if rng.gen::<f64>() < rate {
                let bounds = encoding.bounds(i);
                *gene = rng.gen_range(bounds.lower()..=bounds.upper());
                changed = true;
            }
        }
        changed
    }
}

/// Uniform-reset mutation for integer chromosomes. Every gene is replaced by a uniform draw from
/// its bounds with a probability equal to the mutation rate.
#[derive(Debug, Default)]
pub struct UniformIntegerMutation;

impl Mutation<IntegerEncoding> for UniformIntegerMutation {
    fn mutate(
        &self,
        encoding: &IntegerEncoding,
        chromosome: &mut Vec<i64>,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut changed = false;
        for (i, gene) in chromosome.iter_mut().enumerate() {
            if rng.gen::<f64>() < rate {
                let bounds = encoding.bounds(i);
                let new_gene = rng.gen_range(bounds.lower()..=bounds.upper());
                changed = changed || new_gene != *gene;
                *gene = new_gene;
            }
        }
        changed
    }
}

/// Inversion mutation for permutation chromosomes. With a probability equal to the mutation
/// rate, a random range of the chromosome is reversed.
#[derive(Debug, Default)]
pub struct InversionMutation;

impl Mutation<PermutationEncoding> for InversionMutation {
    fn mutate(
        &self,
        _encoding: &PermutationEncoding,
        chromosome: &mut Vec<usize>,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        if rng.gen::<f64>() >= rate || chromosome.len() < 2 {
            return false;
        }

        let range_len = rng.gen_range(2..=chromosome.len());
        let first = rng.gen_range(0..=chromosome.len() - range_len);
        chromosome[first..first + range_len].reverse();
        true
    }
}

/// Swap mutation for permutation chromosomes. With a probability equal to the mutation rate, two
/// random genes exchange their positions.
#[derive(Debug, Default)]
pub struct SwapMutation;

impl Mutation<PermutationEncoding> for SwapMutation {
    fn mutate(
        &self,
        _encoding: &PermutationEncoding,
        chromosome: &mut Vec<usize>,
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        if rng.gen::<f64>() >= rate || chromosome.len() < 2 {
            return false;
        }

        let first = rng.gen_range(0..chromosome.len());
        let mut second = rng.gen_range(0..chromosome.len() - 1);
        if second >= first {
            second += 1;
        }
        chromosome.swap(first, second);
        true
    }
}

/// Composite mutation for mixed encodings. The component operators are applied to the matching
/// chromosome components independently.
#[derive(Debug)]
pub struct MixedMutation<X, Y>(pub X, pub Y);

impl<A, B, X, Y> Mutation<MixedEncoding<A, B>> for MixedMutation<X, Y>
where
    A: Encoding,
    B: Encoding,
    X: Mutation<A>,
    Y: Mutation<B>,
{
    fn mutate(
        &self,
        encoding: &MixedEncoding<A, B>,
        chromosome: &mut (A::Chromosome, B::Chromosome),
        rate: f64,
        rng: &mut dyn RngCore,
    ) -> bool {
        let first_changed = self.0.mutate(&encoding.first, &mut chromosome.0, rate, rng);
        let second_changed = self.1.mutate(&encoding.second, &mut chromosome.1, rate, rng);
        first_changed || second_changed
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::core::{Bounds, BoundsSpec, Encoding};

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(33)
    }

    #[test]
    /// With a mutation rate of 0 the chromosome never changes.
    fn test_zero_rate_is_noop() {
        let mut rng = rng();
        let encoding = BinaryEncoding::new(16).unwrap();
        let mut chromosome = encoding.generate(&mut rng);
        let original = chromosome.clone();

        let changed = BitFlipMutation.mutate(&encoding, &mut chromosome, 0.0, &mut rng);
        assert!(!changed);
        assert_eq!(chromosome, original);
    }

    #[test]
    fn test_bit_flip_all() {
        let mut rng = rng();
        let encoding = BinaryEncoding::new(8).unwrap();
        let mut chromosome = vec![false; 8];

        let changed = BitFlipMutation.mutate(&encoding, &mut chromosome, 1.0, &mut rng);
        assert!(changed);
        assert_eq!(chromosome, vec![true; 8]);
    }

    #[test]
    fn test_polynomial_respects_bounds() {
        let mut rng = rng();
        let encoding =
            RealEncoding::new(4, BoundsSpec::Uniform(Bounds::new(-2.0, 3.0).unwrap())).unwrap();
        let pm = PolynomialMutation::default();

        for _ in 0..200 {
            let mut chromosome = encoding.generate(&mut rng);
            pm.mutate(&encoding, &mut chromosome, 0.5, &mut rng);
            assert!(encoding.is_valid(&chromosome));
        }
    }

    #[test]
    fn test_polynomial_invalid_args() {
        assert!(PolynomialMutation::new(-2.0).is_err());
    }

    #[test]
    fn test_uniform_integer_stays_in_bounds() {
        let mut rng = rng();
        let encoding =
            IntegerEncoding::new(10, BoundsSpec::Uniform(Bounds::new(0, 94).unwrap())).unwrap();

        for _ in 0..100 {
            let mut chromosome = encoding.generate(&mut rng);
            UniformIntegerMutation.mutate(&encoding, &mut chromosome, 0.3, &mut rng);
            assert!(encoding.is_valid(&chromosome));
        }
    }

    #[test]
    fn test_inversion_keeps_permutation() {
        let mut rng = rng();
        let encoding = PermutationEncoding::new(20).unwrap();

        for _ in 0..100 {
            let mut chromosome = encoding.generate(&mut rng);
            let changed = InversionMutation.mutate(&encoding, &mut chromosome, 1.0, &mut rng);
            assert!(changed);
            assert!(encoding.is_valid(&chromosome));
        }
    }

    #[test]
    fn test_swap_exchanges_two_genes() {
        let mut rng = rng();
        let encoding = PermutationEncoding::new(10).unwrap();
        let mut chromosome: Vec<usize> = (0..10).collect();

        let changed = SwapMutation.mutate(&encoding, &mut chromosome, 1.0, &mut rng);
        assert!(changed);
        assert!(encoding.is_valid(&chromosome));
        let moved = chromosome
            .iter()
            .enumerate()
            .filter(|(i, gene)| *i != **gene)
            .count();
        assert_eq!(moved, 2);
    }

    #[test]
    fn test_mixed_mutation() {
        let mut rng = rng();
        let encoding = MixedEncoding::new(
            BinaryEncoding::new(8).unwrap(),
            PermutationEncoding::new(6).unwrap(),
        );
        let mutation = MixedMutation(BitFlipMutation, SwapMutation);

        let mut chromosome = encoding.generate(&mut rng);
        let changed = mutation.mutate(&encoding, &mut chromosome, 1.0, &mut rng);
        assert!(changed);
        assert!(encoding.is_valid(&chromosome));
    }
}
