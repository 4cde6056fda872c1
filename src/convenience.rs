use crate::error::{InferenceError, Result};
use crate::variants::{VariantData, VariantDataBuilder};
use vcfire::VcfFile;

/// Load variant data from a VCF file. Only the genotype calls are read; the
/// phased alleles of every sample are flattened into one haplotype panel.
///
/// # Parameters
/// - `file`: path to the VCF file
/// - `compressed`: whether the file is gzip compressed
/// - `sequence_length`: the genome length the variant positions refer to
pub fn from_vcf(file: &str, compressed: bool, sequence_length: f64) -> Result<VariantData> {
    let input = VcfFile::parse(file, compressed)?;

    let mut builder = VariantDataBuilder::new(sequence_length);
    for record in input.records()? {
        let record = record
            .map_err(|e| InferenceError::invalid_data(format!("malformed VCF record: {e}")))?;

        let mut genotypes = Vec::new();
        for sample_info in record.sample_info.iter() {
            for sample in sample_info.samples() {
                let genotype = sample.get_genotype().ok_or_else(|| {
                    InferenceError::invalid_data(format!(
                        "record at position {} has no genotype call",
                        record.position
                    ))
                })?;

                for allele in genotype.split('|') {
                    genotypes.push(allele.parse::<i8>().map_err(|_| {
                        InferenceError::invalid_data(format!(
                            "unparsable genotype '{}' at position {}",
                            genotype, record.position
                        ))
                    })?);
                }
            }
        }

        builder.add_variant_site(genotypes, record.position as f64)?;
    }

    builder.finalize()
}
