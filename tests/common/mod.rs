#![allow(dead_code)]

use treeweave::config::InferenceConfig;
use treeweave::ts::{TreeSequence, TreeSequenceGenerator};
use treeweave::variants::{Allele, VariantData, VariantDataBuilder};

/// Build variant data from site-major genotype rows; site `i` is placed at
/// position `i + 1`.
pub fn create_variant_data<const S: usize>(
    sequence_len: f64,
    variant_sites: &[[Allele; S]],
) -> VariantData {
    VariantDataBuilder::from_iter(
        sequence_len,
        variant_sites
            .iter()
            .enumerate()
            .map(|(i, site)| (site.to_vec(), i as f64 + 1.0)),
    )
    .unwrap()
    .finalize()
    .unwrap()
}

/// Run the full pipeline with default parameters.
pub fn infer(variant_data: VariantData) -> TreeSequence {
    TreeSequenceGenerator::new(variant_data, InferenceConfig::default())
        .unwrap()
        .run()
        .unwrap()
}

/// Collect the edgesets of a tree sequence as owned tuples.
pub fn edgesets(tree_sequence: &TreeSequence) -> Vec<(f64, f64, usize, Vec<usize>)> {
    tree_sequence
        .edgeset_iter()
        .map(|(left, right, parent, children)| (left, right, parent, children.to_vec()))
        .collect()
}
