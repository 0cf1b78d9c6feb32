use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Shape;

/// Supplies the shape of each newly spawned piece.
///
/// Sessions draw from a `ShapeSource` instead of a global random number
/// generator so that tests and replays can inject a fixed sequence.
pub trait ShapeSource {
    fn next_shape(&mut self) -> Shape;
}

impl<S> ShapeSource for &mut S
where
    S: ShapeSource + ?Sized,
{
    fn next_shape(&mut self) -> Shape {
        (**self).next_shape()
    }
}

/// Draws every shape uniformly at random from a seeded PCG generator.
///
/// # Example
///
/// ```
/// use blockfall_engine::{RandomShapes, ShapeSeed, ShapeSource as _};
///
/// let seed: ShapeSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// let mut a = RandomShapes::with_seed(seed);
/// let mut b = RandomShapes::with_seed(seed);
/// for _ in 0..20 {
///     assert_eq!(a.next_shape(), b.next_shape());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RandomShapes {
    rng: Pcg32,
}

impl Default for RandomShapes {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomShapes {
    /// Creates a source with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but reproducible.
    #[must_use]
    pub fn with_seed(seed: ShapeSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl ShapeSource for RandomShapes {
    fn next_shape(&mut self) -> Shape {
        self.rng.random()
    }
}

/// Cycles through a fixed list of shapes.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Shape, ShapeSequence, ShapeSource as _};
///
/// let mut source = ShapeSequence::new([Shape::I, Shape::T]);
/// assert_eq!(source.next_shape(), Shape::I);
/// assert_eq!(source.next_shape(), Shape::T);
/// assert_eq!(source.next_shape(), Shape::I);
/// ```
#[derive(Debug, Clone)]
pub struct ShapeSequence {
    shapes: Vec<Shape>,
    next: usize,
}

impl ShapeSequence {
    /// # Panics
    ///
    /// Panics if `shapes` is empty.
    #[must_use]
    pub fn new<I>(shapes: I) -> Self
    where
        I: IntoIterator<Item = Shape>,
    {
        let shapes: Vec<_> = shapes.into_iter().collect();
        assert!(!shapes.is_empty(), "shape sequence must not be empty");
        Self { shapes, next: 0 }
    }
}

impl ShapeSource for ShapeSequence {
    fn next_shape(&mut self) -> Shape {
        let shape = self.shapes[self.next];
        self.next = (self.next + 1) % self.shapes.len();
        shape
    }
}

/// Seed for deterministic shape generation.
///
/// A 128-bit seed, written as a 32-character hex string both in its
/// [`Display`](fmt::Display) form and when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSeed([u8; 16]);

/// Error returned when parsing a [`ShapeSeed`] from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SeedParseError {
    #[display("invalid seed: expected 32 hex characters, got {_0}")]
    Length(#[error(not(source))] usize),
    #[display("invalid seed: {_0:?} is not a hex string")]
    Digits(#[error(not(source))] String),
}

impl fmt::Display for ShapeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for ShapeSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(SeedParseError::Length(s.len()));
        }
        let num =
            u128::from_str_radix(s, 16).map_err(|_| SeedParseError::Digits(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for ShapeSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `ShapeSeed` values with `rng.random()`.
impl Distribution<ShapeSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ShapeSeed(seed)
    }
}
