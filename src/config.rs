//! Tuning parameters for the inference pipeline.

use crate::error::{InferenceError, Result};

/// Parameters controlling the copying model and the capacity hints for the
/// growable interval stores. The block sizes are not hard limits, they seed
/// the initial capacity of the respective containers.
#[derive(Clone, Debug)]
pub struct InferenceConfig {
    /// Per-site recombination probability of the copying model
    pub recombination_rate: f64,

    /// Per-site mismatch probability of the copying model
    pub error_rate: f64,

    /// Capacity hint for per-site segment lists (store builder, traceback)
    pub segment_block_size: usize,

    /// Capacity hint for the pending parent-interval buffer
    pub node_mapping_block_size: usize,

    /// Capacity hint for per-parent edgeset lists
    pub edgeset_block_size: usize,

    /// Capacity hint for per-site mutation lists
    pub mutation_list_node_block_size: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            recombination_rate: 1e-2,
            error_rate: 1e-3,
            segment_block_size: 1024,
            node_mapping_block_size: 1024,
            edgeset_block_size: 1024,
            mutation_list_node_block_size: 1024,
        }
    }
}

impl InferenceConfig {
    /// Create a configuration with the given model rates and default block
    /// sizes.
    pub fn with_rates(recombination_rate: f64, error_rate: f64) -> Self {
        Self {
            recombination_rate,
            error_rate,
            ..Self::default()
        }
    }

    /// Validate the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.recombination_rate) {
            return Err(InferenceError::config(
                "recombination_rate must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(InferenceError::config("error_rate must be within [0, 1]"));
        }
        if self.segment_block_size == 0
            || self.node_mapping_block_size == 0
            || self.edgeset_block_size == 0
            || self.mutation_list_node_block_size == 0
        {
            return Err(InferenceError::config("block sizes must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(InferenceConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let config = InferenceConfig::with_rates(1.5, 1e-3);
        assert!(config.validate().is_err());

        let config = InferenceConfig::with_rates(1e-2, -0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_block_sizes() {
        let mut config = InferenceConfig::default();
        config.segment_block_size = 0;
        assert!(config.validate().is_err());
    }
}
