//! Inference of genealogical tree sequences from panels of aligned binary
//! haplotypes.
//!
//! Given N sample haplotypes over L biallelic sites, the crate synthesizes a
//! hierarchy of ancestral haplotypes ordered by inferred age, finds for every
//! ancestor and sample a best-matching copying path through older ancestors
//! under a probabilistic recombination-mutation model, and assembles those
//! paths into a consistent forest of edgesets and mutations over genomic
//! intervals.
//!
//! The pipeline is exposed both as a whole through
//! [`ts::TreeSequenceGenerator`] and piecewise through its stages:
//!
//! - [`variants`]: the validated input panel
//! - [`ancestors::AncestorBuilder`]: ancestral haplotype synthesis from
//!   sample frequencies at focal sites
//! - [`store::AncestorStore`]: the run-length encoded, read-only ancestor
//!   matrix with epoch indexing
//! - [`matching::AncestorMatcher`]: the Li–Stephens copying model producing
//!   per-query tracebacks
//! - [`ts::TreeSequenceBuilder`]: resolution of copying paths into edgesets,
//!   mutations, and live segments
//!
//! ```
//! use treeweave::config::InferenceConfig;
//! use treeweave::ts::TreeSequenceGenerator;
//! use treeweave::variants::VariantDataBuilder;
//!
//! # fn main() -> treeweave::error::Result<()> {
//! let mut builder = VariantDataBuilder::new(6.0);
//! builder.add_variant_site(vec![0, 1, 1, 0], 1.0)?;
//! builder.add_variant_site(vec![0, 1, 1, 1], 3.0)?;
//! builder.add_variant_site(vec![1, 0, 0, 1], 5.0)?;
//!
//! let generator = TreeSequenceGenerator::new(builder.finalize()?, InferenceConfig::default())?;
//! let tree_sequence = generator.run()?;
//! assert!(tree_sequence.num_edgesets() > 0);
//! # Ok(())
//! # }
//! ```

pub mod ancestors;
pub mod config;
pub mod convenience;
pub mod error;
pub mod matching;
pub mod store;
pub mod ts;
pub mod variants;
