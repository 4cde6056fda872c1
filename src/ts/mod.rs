mod builder;
mod segment_list;
mod tree_sequence;

pub use builder::{Edgeset, MutationRecord, TreeSequenceBuilder};
pub use segment_list::{IntervalSegment, SegmentList};
pub use tree_sequence::{EdgesetTable, MutationTable, NodeTable, TreeSequence};

use crate::ancestors::AncestorBuilder;
use crate::config::InferenceConfig;
use crate::error::{InferenceError, Result};
use crate::matching::{AncestorMatcher, Traceback};
use crate::store::AncestorStore;
use crate::variants::{VariantData, VariantIndex};
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::info;

/// Runs the full inference pipeline: ancestor generation, store
/// construction, epoch-by-epoch matching of ancestors, and the final sample
/// pass.
///
/// Queries within one epoch are independent and run in parallel; the tree
/// sequence builder consumes their tracebacks serially in id order, and the
/// epoch resolve is the barrier between generations.
pub struct TreeSequenceGenerator {
    variant_data: VariantData,
    config: InferenceConfig,
}

impl TreeSequenceGenerator {
    /// Create a generator for the given variant data. The configuration is
    /// validated here, before any work starts.
    pub fn new(variant_data: VariantData, config: InferenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            variant_data,
            config,
        })
    }

    /// Run the inference pipeline and produce the output tables.
    pub fn run(&self) -> Result<TreeSequence> {
        let num_sites = self.variant_data.len();
        let num_samples = self.variant_data.get_num_samples();

        let ancestor_builder = AncestorBuilder::new(&self.variant_data);
        let ancestors = ancestor_builder.generate_ancestors()?;
        info!(
            num_ancestors = ancestors.len(),
            num_sites, num_samples, "generated ancestors"
        );

        let store = AncestorStore::from_ancestors(
            self.variant_data.variant_positions().to_vec(),
            self.variant_data.get_sequence_length(),
            &ancestors,
            self.config.segment_block_size,
        )?;
        info!(
            num_segments = store.num_segments(),
            num_epochs = store.num_epochs(),
            "finalized ancestor store"
        );
        drop(ancestors);

        let matcher = AncestorMatcher::new(&store, self.config.recombination_rate);
        let mut tree_builder = TreeSequenceBuilder::new(&store, num_samples, &self.config);

        // match the ancestors epoch by epoch, oldest first; epoch 0 is the
        // root, which copies from nobody
        for epoch in 1..store.num_epochs() {
            let epoch_ancestors = store.get_epoch_ancestors(epoch);

            let results = epoch_ancestors
                .par_iter()
                .map(|&ancestor| {
                    let view = store.get_ancestor(ancestor);
                    // only regions where an older ancestor is still live hold
                    // viable copying parents
                    let (start, end) = tree_builder
                        .live_range(view.num_older_ancestors, view.start, view.end)
                        .ok_or(InferenceError::NoEligibleParents)?;
                    let mut traceback = Traceback::with_block_size(
                        store.num_sites(),
                        self.config.segment_block_size,
                    );
                    let end_site_parent = matcher.best_path(
                        view.num_older_ancestors,
                        &view.alleles,
                        start,
                        end,
                        &[],
                        self.config.error_rate,
                        &mut traceback,
                    )?;
                    Ok((ancestor, view, start, end, end_site_parent, traceback))
                })
                .collect::<Vec<Result<_>>>();

            for result in results {
                let (ancestor, view, start, end, end_site_parent, traceback) = result?;
                tree_builder.update(
                    ancestor.unwrap(),
                    &view.alleles,
                    start,
                    end,
                    end_site_parent,
                    &traceback,
                )?;
            }

            let children: Vec<usize> = epoch_ancestors.iter().map(|a| a.unwrap()).collect();
            tree_builder.resolve(epoch, &children)?;
        }

        // match the samples against the full store as the youngest generation
        let samples = self.variant_data.into_samples();
        let num_ancestors = store.num_ancestors();
        let (sample_start, sample_end) = tree_builder
            .live_range(num_ancestors, VariantIndex(0), VariantIndex(num_sites))
            .ok_or(InferenceError::NoEligibleParents)?;

        let results = (0..num_samples)
            .into_par_iter()
            .map(|sample| {
                let mut traceback = Traceback::with_block_size(
                    store.num_sites(),
                    self.config.segment_block_size,
                );
                let end_site_parent = matcher.best_path(
                    num_ancestors,
                    &samples[sample],
                    sample_start,
                    sample_end,
                    &[],
                    self.config.error_rate,
                    &mut traceback,
                )?;
                Ok((sample, end_site_parent, traceback))
            })
            .collect::<Vec<Result<_>>>();

        let mut sample_nodes = Vec::with_capacity(num_samples);
        for result in results {
            let (sample, end_site_parent, traceback) = result?;
            let child = num_ancestors + sample;
            tree_builder.update(
                child,
                &samples[sample],
                sample_start,
                sample_end,
                end_site_parent,
                &traceback,
            )?;
            sample_nodes.push(child);
        }
        tree_builder.resolve(store.num_epochs(), &sample_nodes)?;

        info!(
            num_edgesets = tree_builder.num_edgesets(),
            num_mutations = tree_builder.num_mutations(),
            "resolved tree sequence"
        );

        Ok(TreeSequence::from_builder(&tree_builder))
    }
}
