use crate::error::{InferenceError, Result};
use crate::variants::{
    Allele, SequencePosition, VariantData, VariantSite, ANCESTRAL_STATE, DERIVED_STATE,
};

/// A builder for [`VariantData`] instances.
///
/// The builder performs all input validation, so the downstream pipeline can
/// assume clean biallelic data: every allele is 0 or 1, positions are
/// monotonically nondecreasing, and the panel is non-empty.
#[derive(Clone, Debug)]
pub struct VariantDataBuilder {
    sites: Vec<VariantSite>,
    positions: Vec<SequencePosition>,
    num_samples: usize,
    sequence_length: SequencePosition,
}

impl VariantDataBuilder {
    /// A new empty builder for a genome with given sequence length
    pub fn new(sequence_length: f64) -> Self {
        Self {
            sites: Vec::default(),
            positions: Vec::default(),
            num_samples: 0,
            sequence_length: SequencePosition::from_f64(sequence_length),
        }
    }

    /// Convenience constructor that adds all sites from an iterator of
    /// `(genotypes, position)` tuples.
    pub fn from_iter(
        sequence_length: f64,
        iter: impl Iterator<Item = (Vec<Allele>, f64)>,
    ) -> Result<Self> {
        let mut builder = Self::new(sequence_length);
        for (genotypes, position) in iter {
            builder.add_variant_site(genotypes, position)?;
        }
        Ok(builder)
    }

    /// Add a variant site to the variant data.
    ///
    /// # Parameters
    /// - `genotypes` a vector of allele states, one per sample, each of which
    ///   must be 0 or 1. The number of samples is inferred from the first
    ///   state vector added to the builder.
    /// - `position` the position of the variant site in the reference genome.
    ///   Sites must be added in nondecreasing position order.
    pub fn add_variant_site(&mut self, genotypes: Vec<Allele>, position: f64) -> Result<()> {
        if genotypes.is_empty() {
            return Err(InferenceError::invalid_data("empty genotype vector"));
        }
        if self.num_samples != 0 && genotypes.len() != self.num_samples {
            return Err(InferenceError::invalid_data(format!(
                "genotype vector has {} entries, expected {}",
                genotypes.len(),
                self.num_samples
            )));
        }
        if let Some(&state) = genotypes
            .iter()
            .find(|&&s| s != ANCESTRAL_STATE && s != DERIVED_STATE)
        {
            return Err(InferenceError::invalid_data(format!(
                "allele state {} at position {} is not biallelic",
                state, position
            )));
        }
        if let Some(last) = self.positions.last() {
            if position < last.unwrap() {
                return Err(InferenceError::invalid_data(format!(
                    "site positions must be nondecreasing ({} after {})",
                    position, last
                )));
            }
        }

        if self.num_samples == 0 {
            self.num_samples = genotypes.len();
        }

        let position = SequencePosition::from_f64(position);
        self.positions.push(position);
        self.sites.push(VariantSite::new(genotypes, position));
        Ok(())
    }

    /// Generate [`VariantData`] from the current builder state.
    pub fn finalize(self) -> Result<VariantData> {
        if self.sites.is_empty() {
            return Err(InferenceError::invalid_data(
                "variant data contains no sites",
            ));
        }

        Ok(VariantData::new(
            self.sites,
            self.positions,
            self.sequence_length,
            self.num_samples,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_valid_data() {
        let mut builder = VariantDataBuilder::new(10.0);
        builder.add_variant_site(vec![0, 1, 1, 0], 1.0).unwrap();
        builder.add_variant_site(vec![0, 0, 1, 1], 2.5).unwrap();

        let data = builder.finalize().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.get_num_samples(), 4);
        assert_eq!(data.iter().map(|s| s.frequency()).collect::<Vec<_>>(), [2, 2]);
    }

    #[test]
    fn rejects_non_biallelic_states() {
        let mut builder = VariantDataBuilder::new(10.0);
        assert!(builder.add_variant_site(vec![0, 2, 1, 0], 1.0).is_err());
        assert!(builder.add_variant_site(vec![0, -1, 1, 0], 1.0).is_err());
    }

    #[test]
    fn rejects_unsorted_positions() {
        let mut builder = VariantDataBuilder::new(10.0);
        builder.add_variant_site(vec![0, 1], 5.0).unwrap();
        assert!(builder.add_variant_site(vec![1, 0], 4.0).is_err());
    }

    #[test]
    fn rejects_sample_count_mismatch() {
        let mut builder = VariantDataBuilder::new(10.0);
        builder.add_variant_site(vec![0, 1, 1], 1.0).unwrap();
        assert!(builder.add_variant_site(vec![0, 1], 2.0).is_err());
    }

    #[test]
    fn rejects_empty_panel() {
        let builder = VariantDataBuilder::new(10.0);
        assert!(builder.finalize().is_err());
    }

    #[test]
    fn transposes_into_samples() {
        let mut builder = VariantDataBuilder::new(10.0);
        builder.add_variant_site(vec![0, 1, 1], 1.0).unwrap();
        builder.add_variant_site(vec![1, 0, 1], 2.0).unwrap();

        let samples = builder.finalize().unwrap().into_samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], vec![0, 1]);
        assert_eq!(samples[1], vec![1, 0]);
        assert_eq!(samples[2], vec![1, 1]);
    }
}
