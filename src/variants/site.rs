use crate::variants::{Allele, SequencePosition, DERIVED_STATE};

/// A single variant site defined by the genotype state of every sample.
#[derive(Clone, Debug)]
pub struct VariantSite {
    pub(crate) genotypes: Vec<Allele>,
    // position in the genome
    pub(crate) position: SequencePosition,
    // number of samples carrying the derived allele
    pub(crate) frequency: usize,
}

impl VariantSite {
    /// Create a new variant site from a vector of genotypes and its position
    /// in the genome. The genotypes must contain only the values 0 and 1;
    /// the [`VariantDataBuilder`] rejects anything else before a site is
    /// constructed.
    ///
    /// [`VariantDataBuilder`]: super::VariantDataBuilder
    pub(crate) fn new(genotypes: Vec<Allele>, position: SequencePosition) -> Self {
        let frequency = genotypes.iter().filter(|&&s| s == DERIVED_STATE).count();
        VariantSite {
            genotypes,
            position,
            frequency,
        }
    }

    /// The genotype column of this site, one allele per sample.
    pub fn genotypes(&self) -> &[Allele] {
        &self.genotypes
    }

    /// The position of this site in the genome.
    pub fn position(&self) -> SequencePosition {
        self.position
    }

    /// The number of samples carrying the derived allele at this site.
    pub fn frequency(&self) -> usize {
        self.frequency
    }
}
