use std::fmt::Debug;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::core::Error;
use crate::utils::{float_is_less_eq, float_vec_is_equal};

/// The inclusive lower and upper bounds of a gene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds<T> {
    lower: T,
    upper: T,
}

impl<T: PartialOrd + Copy + Debug> Bounds<T> {
    /// Create the closed range [`lower`, `upper`]. This returns an error if the lower bound is
    /// larger than the upper bound.
    ///
    /// # Arguments
    ///
    /// * `lower`: The lower bound (inclusive).
    /// * `upper`: The upper bound (inclusive).
    ///
    /// returns: `Result<Bounds<T>, Error>`
    pub fn new(lower: T, upper: T) -> Result<Self, Error> {
        if lower > upper {
            return Err(Error::InvalidBounds(
                format!("{:?}", lower),
                format!("{:?}", upper),
            ));
        }
        Ok(Self { lower, upper })
    }

    /// Get the lower bound (inclusive).
    pub fn lower(&self) -> T {
        self.lower
    }

    /// Get the upper bound (inclusive).
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Check whether a value lies within the bounds.
    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// The bounds of all genes in a chromosome. Bounded encodings either apply a single bound to
/// every gene position or carry one bound per position.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundsSpec<T> {
    /// The same bounds apply to every gene.
    Uniform(Bounds<T>),
    /// One bound per gene position. The vector length must equal the chromosome length.
    PerGene(Vec<Bounds<T>>),
}

impl<T: PartialOrd + Copy + Debug> BoundsSpec<T> {
    /// Get the bounds that apply to the gene at `index`.
    pub fn get(&self, index: usize) -> &Bounds<T> {
        match self {
            BoundsSpec::Uniform(bounds) => bounds,
            BoundsSpec::PerGene(bounds) => &bounds[index],
        }
    }

    /// Check that the bounds are usable for a chromosome of the given length. Per-gene bounds
    /// must provide exactly one bound for each gene and may not be empty.
    ///
    /// # Arguments
    ///
    /// * `chromosome_len`: The chromosome length.
    ///
    /// returns: `Result<(), Error>`
    pub fn validate(&self, chromosome_len: usize) -> Result<(), Error> {
        if let BoundsSpec::PerGene(bounds) = self {
            if bounds.len() != chromosome_len {
                return Err(Error::MismatchedBounds(chromosome_len, bounds.len()));
            }
        }
        Ok(())
    }
}

/// The gene encoding of a problem. An encoding knows how to generate a valid random chromosome,
/// how to check chromosome validity (size and bounds) and how to compare two chromosomes for
/// equality. Variation operators are generic over the encoding so that gene-type dispatch happens
/// at compile time.
pub trait Encoding: Clone + Debug + Send + Sync + 'static {
    /// The chromosome type produced by this encoding.
    type Chromosome: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Whether genes of this encoding carry lower and upper bounds.
    const IS_BOUNDED: bool;

    /// Generate a random, valid chromosome.
    ///
    /// # Arguments
    ///
    /// * `rng`: The random number generator.
    ///
    /// returns: `Self::Chromosome`
    fn generate(&self, rng: &mut dyn RngCore) -> Self::Chromosome;

    /// Check that a chromosome has the expected size and respects the gene bounds.
    fn is_valid(&self, chromosome: &Self::Chromosome) -> bool;

    /// Compare two chromosomes for equality. Real-coded chromosomes use the configured tolerant
    /// float comparison, all other encodings compare exactly.
    fn chromosomes_equal(&self, a: &Self::Chromosome, b: &Self::Chromosome) -> bool {
        a == b
    }
}

/// Helper trait for the encodings whose chromosome is a plain vector of genes. The generic
/// single-point, two-point and uniform crossover operators are implemented for these encodings.
pub trait VectorEncoding: Encoding<Chromosome = Vec<Self::Gene>> {
    /// The gene type.
    type Gene: Clone + Debug + PartialEq + Send + Sync + 'static;
}

/// Binary encoding. Chromosomes are vectors of `bool` genes without bounds.
#[derive(Clone, Debug)]
pub struct BinaryEncoding {
    chromosome_len: usize,
}

impl BinaryEncoding {
    /// Create a binary encoding for chromosomes with `chromosome_len` genes.
    pub fn new(chromosome_len: usize) -> Result<Self, Error> {
        if chromosome_len == 0 {
            return Err(Error::EmptyChromosome);
        }
        Ok(Self { chromosome_len })
    }

    pub fn chromosome_len(&self) -> usize {
        self.chromosome_len
    }
}

impl Encoding for BinaryEncoding {
    type Chromosome = Vec<bool>;

    const IS_BOUNDED: bool = false;

    fn generate(&self, rng: &mut dyn RngCore) -> Self::Chromosome {
        (0..self.chromosome_len).map(|_| rng.gen()).collect()
    }

    fn is_valid(&self, chromosome: &Self::Chromosome) -> bool {
        chromosome.len() == self.chromosome_len
    }
}

impl VectorEncoding for BinaryEncoding {
    type Gene = bool;
}

/// Real encoding. Chromosomes are vectors of `f64` genes, each bounded by the configured closed
/// interval.
#[derive(Clone, Debug)]
pub struct RealEncoding {
    chromosome_len: usize,
    bounds: BoundsSpec<f64>,
}

impl RealEncoding {
    /// Create a real encoding for chromosomes with `chromosome_len` genes.
    ///
    /// # Arguments
    ///
    /// * `chromosome_len`: The number of genes in a chromosome.
    /// * `bounds`: The gene bounds, either one bound for all positions or one per position.
    ///
    /// returns: `Result<RealEncoding, Error>`
    pub fn new(chromosome_len: usize, bounds: BoundsSpec<f64>) -> Result<Self, Error> {
        if chromosome_len == 0 {
            return Err(Error::EmptyChromosome);
        }
        bounds.validate(chromosome_len)?;
        Ok(Self {
            chromosome_len,
            bounds,
        })
    }

    pub fn chromosome_len(&self) -> usize {
        self.chromosome_len
    }

    /// Get the bounds of the gene at `index`.
    pub fn bounds(&self, index: usize) -> &Bounds<f64> {
        self.bounds.get(index)
    }

    /// Clamp every gene of the chromosome to its bounds.
    pub fn clamp(&self, chromosome: &mut [f64]) {
        for (i, gene) in chromosome.iter_mut().enumerate() {
            let bounds = self.bounds.get(i);
            *gene = gene.clamp(bounds.lower(), bounds.upper());
        }
    }
}

impl Encoding for RealEncoding {
    type Chromosome = Vec<f64>;

    const IS_BOUNDED: bool = true;

    fn generate(&self, rng: &mut dyn RngCore) -> Self::Chromosome {
        (0..self.chromosome_len)
            .map(|i| {
                let bounds = self.bounds.get(i);
                if bounds.lower() == bounds.upper() {
                    bounds.lower()
                } else {
                    rng.gen_range(bounds.lower()..=bounds.upper())
                }
            })
            .collect()
    }

    fn is_valid(&self, chromosome: &Self::Chromosome) -> bool {
        chromosome.len() == self.chromosome_len
            && chromosome.iter().enumerate().all(|(i, gene)| {
                let bounds = self.bounds.get(i);
                float_is_less_eq(bounds.lower(), *gene) && float_is_less_eq(*gene, bounds.upper())
            })
    }

    fn chromosomes_equal(&self, a: &Self::Chromosome, b: &Self::Chromosome) -> bool {
        float_vec_is_equal(a, b)
    }
}

impl VectorEncoding for RealEncoding {
    type Gene = f64;
}

/// Integer encoding. Chromosomes are vectors of bounded `i64` genes.
#[derive(Clone, Debug)]
pub struct IntegerEncoding {
    chromosome_len: usize,
    bounds: BoundsSpec<i64>,
}

impl IntegerEncoding {
    /// Create an integer encoding for chromosomes with `chromosome_len` genes.
    ///
    /// # Arguments
    ///
    /// * `chromosome_len`: The number of genes in a chromosome.
    /// * `bounds`: The gene bounds, either one bound for all positions or one per position.
    ///
    /// returns: `Result<IntegerEncoding, Error>`
    pub fn new(chromosome_len: usize, bounds: BoundsSpec<i64>) -> Result<Self, Error> {
        if chromosome_len == 0 {
            return Err(Error::EmptyChromosome);
        }
        bounds.validate(chromosome_len)?;
        Ok(Self {
            chromosome_len,
            bounds,
        })
    }

    pub fn chromosome_len(&self) -> usize {
        self.chromosome_len
    }

    /// Get the bounds of the gene at `index`.
    pub fn bounds(&self, index: usize) -> &Bounds<i64> {
        self.bounds.get(index)
    }
}

impl Encoding for IntegerEncoding {
    type Chromosome = Vec<i64>;

    const IS_BOUNDED: bool = true;

    fn generate(&self, rng: &mut dyn RngCore) -> Self::Chromosome {
        (0..self.chromosome_len)
            .map(|i| {
                let bounds = self.bounds.get(i);
                rng.gen_range(bounds.lower()..=bounds.upper())
            })
            .collect()
    }

    fn is_valid(&self, chromosome: &Self::Chromosome) -> bool {
        chromosome.len() == self.chromosome_len
            && chromosome
                .iter()
                .enumerate()
                .all(|(i, gene)| self.bounds.get(i).contains(*gene))
    }
}

impl VectorEncoding for IntegerEncoding {
    type Gene = i64;
}

/// Permutation encoding. A chromosome is a permutation of the indices `0..chromosome_len`.
#[derive(Clone, Debug)]
pub struct PermutationEncoding {
    chromosome_len: usize,
}

impl PermutationEncoding {
    /// Create a permutation encoding over the indices `0..chromosome_len`.
    pub fn new(chromosome_len: usize) -> Result<Self, Error> {
        if chromosome_len == 0 {
            return Err(Error::EmptyChromosome);
        }
        Ok(Self { chromosome_len })
    }

    pub fn chromosome_len(&self) -> usize {
        self.chromosome_len
    }
}

impl Encoding for PermutationEncoding {
    type Chromosome = Vec<usize>;

    const IS_BOUNDED: bool = false;

    fn generate(&self, rng: &mut dyn RngCore) -> Self::Chromosome {
        let mut chromosome: Vec<usize> = (0..self.chromosome_len).collect();
        chromosome.shuffle(rng);
        chromosome
    }

    fn is_valid(&self, chromosome: &Self::Chromosome) -> bool {
        if chromosome.len() != self.chromosome_len {
            return false;
        }
        let mut seen = vec![false; self.chromosome_len];
        for &gene in chromosome {
            if gene >= self.chromosome_len || seen[gene] {
                return false;
            }
            seen[gene] = true;
        }
        true
    }
}

/// Mixed encoding composed of two component encodings. A mixed chromosome is the ordered tuple
/// of the component chromosomes; nest `MixedEncoding` values to compose more than two
/// components. Variation operators for mixed encodings are tuples of per-component operators,
/// each applied to the matching chromosome component only.
#[derive(Clone, Debug)]
pub struct MixedEncoding<A: Encoding, B: Encoding> {
    pub first: A,
    pub second: B,
}

impl<A: Encoding, B: Encoding> MixedEncoding<A, B> {
    /// Create a mixed encoding from two component encodings.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Encoding, B: Encoding> Encoding for MixedEncoding<A, B> {
    type Chromosome = (A::Chromosome, B::Chromosome);

    const IS_BOUNDED: bool = A::IS_BOUNDED || B::IS_BOUNDED;

    fn generate(&self, rng: &mut dyn RngCore) -> Self::Chromosome {
        (self.first.generate(rng), self.second.generate(rng))
    }

    fn is_valid(&self, chromosome: &Self::Chromosome) -> bool {
        self.first.is_valid(&chromosome.0) && self.second.is_valid(&chromosome.1)
    }

    fn chromosomes_equal(&self, a: &Self::Chromosome, b: &Self::Chromosome) -> bool {
        self.first.chromosomes_equal(&a.0, &b.0) && self.second.chromosomes_equal(&a.1, &b.1)
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Bounds::new(1.0, 0.0).is_err());
        assert!(Bounds::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_mismatched_bounds_length() {
        let bounds = BoundsSpec::PerGene(vec![Bounds::new(0.0, 1.0).unwrap()]);
        let result = RealEncoding::new(3, bounds);
        assert!(matches!(result, Err(Error::MismatchedBounds(3, 1))));
    }

    #[test]
    fn test_real_encoding_generates_valid_chromosomes() {
        let encoding =
            RealEncoding::new(5, BoundsSpec::Uniform(Bounds::new(-1.0, 2.0).unwrap())).unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let chromosome = encoding.generate(&mut rng);
            assert!(encoding.is_valid(&chromosome));
        }
    }

    #[test]
    fn test_real_encoding_rejects_out_of_bounds() {
        let encoding =
            RealEncoding::new(2, BoundsSpec::Uniform(Bounds::new(0.0, 1.0).unwrap())).unwrap();
        assert!(!encoding.is_valid(&vec![0.5, 1.5]));
        assert!(!encoding.is_valid(&vec![0.5]));
    }

    #[test]
    fn test_permutation_encoding() {
        let encoding = PermutationEncoding::new(10).unwrap();
        let mut rng = rng();
        for _ in 0..50 {
            let chromosome = encoding.generate(&mut rng);
            assert!(encoding.is_valid(&chromosome));
        }

        assert!(!encoding.is_valid(&vec![0, 1, 1, 3, 4, 5, 6, 7, 8, 9]));
        assert!(!encoding.is_valid(&vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10]));
    }

    #[test]
    fn test_mixed_encoding() {
        let encoding = MixedEncoding::new(
            BinaryEncoding::new(4).unwrap(),
            RealEncoding::new(2, BoundsSpec::Uniform(Bounds::new(0.0, 1.0).unwrap())).unwrap(),
        );
        let mut rng = rng();
        let chromosome = encoding.generate(&mut rng);
        assert!(encoding.is_valid(&chromosome));
        assert_eq!(chromosome.0.len(), 4);
        assert_eq!(chromosome.1.len(), 2);
    }
}
