use crate::error::{InferenceError, Result};
use crate::store::AlleleSegment;
use crate::variants::Allele;

/// Accumulates ancestral haplotypes into a per-site run-length encoding.
/// Ancestors must be added in emission order (oldest first); each addition
/// either extends the last run at a site or opens a new one, so storage is
/// proportional to the number of runs rather than the full ancestor-by-site
/// matrix.
pub struct AncestorStoreBuilder {
    num_sites: usize,
    num_ancestors: usize,
    sites: Vec<Vec<AlleleSegment>>,
    segment_block_size: usize,
}

impl AncestorStoreBuilder {
    /// Create a builder for haplotypes over the given number of sites.
    pub fn new(num_sites: usize) -> Self {
        Self::with_block_size(num_sites, 1024)
    }

    /// Create a builder whose per-site run lists reserve `segment_block_size`
    /// entries on first use.
    pub fn with_block_size(num_sites: usize, segment_block_size: usize) -> Self {
        Self {
            num_sites,
            num_ancestors: 0,
            sites: vec![Vec::new(); num_sites],
            segment_block_size,
        }
    }

    /// The number of ancestors added so far.
    pub fn num_ancestors(&self) -> usize {
        self.num_ancestors
    }

    /// The number of sites each haplotype spans.
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// The total number of runs over all sites.
    pub fn num_segments(&self) -> usize {
        self.sites.iter().map(|site| site.len()).sum()
    }

    /// Append an ancestral haplotype. The haplotype must span every site;
    /// sites outside the ancestor's defined interval carry the unknown
    /// sentinel, which is run-length encoded like any other value.
    pub fn add(&mut self, haplotype: &[Allele]) -> Result<()> {
        if haplotype.len() != self.num_sites {
            return Err(InferenceError::invalid_data(format!(
                "haplotype spans {} sites, store expects {}",
                haplotype.len(),
                self.num_sites
            )));
        }

        let ancestor = self.num_ancestors;
        for (site, &state) in haplotype.iter().enumerate() {
            let runs = &mut self.sites[site];
            match runs.last_mut() {
                Some(run) if run.end == ancestor && run.state == state => run.end += 1,
                _ => {
                    if runs.is_empty() {
                        runs.reserve(self.segment_block_size);
                    }
                    runs.push(AlleleSegment::new(ancestor, ancestor + 1, state));
                }
            }
        }
        self.num_ancestors += 1;
        Ok(())
    }

    /// The current run list at a single site.
    pub(crate) fn site_segments(&self, site: usize) -> &[AlleleSegment] {
        &self.sites[site]
    }

    /// Flatten the per-site run lists into parallel arrays sorted by
    /// `(site, start)`, the layout the finalized store is built from.
    pub fn dump(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>, Vec<Allele>) {
        let total = self.num_segments();
        let mut site_ids = Vec::with_capacity(total);
        let mut starts = Vec::with_capacity(total);
        let mut ends = Vec::with_capacity(total);
        let mut states = Vec::with_capacity(total);

        for (site, runs) in self.sites.iter().enumerate() {
            for run in runs {
                site_ids.push(site);
                starts.push(run.start);
                ends.push(run.end);
                states.push(run.state);
            }
        }

        (site_ids, starts, ends, states)
    }
}
