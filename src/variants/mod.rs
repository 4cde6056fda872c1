use std::fmt::{Display, Formatter};

mod builder;
mod data;
mod sequence;
mod site;

pub use builder::VariantDataBuilder;
pub use data::{SampleData, VariantData};
pub use sequence::VariantSequence;
pub use site::VariantSite;

/// The state of a sample or ancestor at a single variant site. Only biallelic
/// sites are supported, so the state is either [`ANCESTRAL_STATE`] or
/// [`DERIVED_STATE`]. Ancestral haplotypes additionally use
/// [`UNKNOWN_STATE`] outside the interval they are defined on.
pub type Allele = i8;

/// The reference allele shared by all samples before any mutation.
pub const ANCESTRAL_STATE: Allele = 0;

/// The allele introduced by the mutation at a site.
pub const DERIVED_STATE: Allele = 1;

/// Sentinel for sites at which an ancestral haplotype is not defined.
pub const UNKNOWN_STATE: Allele = -1;

/// A position in the genome. This newtype ensures that sequence positions and
/// variant indices (indices into the variant site vector) aren't mixed up.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct SequencePosition(f64);

impl SequencePosition {
    /// Create a new sequence position from a float genome coordinate.
    pub fn from_f64(position: f64) -> Self {
        Self(position)
    }

    /// Convert a vector of raw coordinates into sequence positions.
    #[inline]
    pub fn from_vec(positions: Vec<f64>) -> Vec<Self> {
        positions.into_iter().map(Self::from_f64).collect()
    }

    /// Get the underlying genome coordinate.
    pub fn unwrap(&self) -> f64 {
        self.0
    }
}

impl Display for SequencePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An index into the variant site vector. The newtype guarantees that variant
/// indices aren't mixed up with [`SequencePosition`].
#[derive(
    Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct VariantIndex(pub(crate) usize);

impl VariantIndex {
    /// Create a new variant index from a raw index.
    pub fn from_usize(index: usize) -> Self {
        Self(index)
    }

    /// Calculate the distance in variants between this index and another.
    /// Does not return the distance in sequence bases.
    pub(crate) fn get_variant_distance(&self, other: VariantIndex) -> usize {
        if self.0 > other.0 {
            self.0 - other.0
        } else {
            other.0 - self.0
        }
    }

    /// Get the underlying usize value of the variant index.
    pub fn unwrap(&self) -> usize {
        self.0
    }
}

impl Display for VariantIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}
