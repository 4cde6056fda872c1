use crate::ancestors::Ancestor;
use crate::variants::VariantIndex;

/// A recombination record of the copying model: if the copying parent at the
/// record's site lies in `[start, end)` (an ancestor id range), the path
/// recombined and the parent at the preceding site is `ancestor`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TracebackSegment {
    pub start: usize,
    pub end: usize,
    pub ancestor: Ancestor,
}

/// Per-site lists of recombination records written by the matcher and
/// consumed by the tree sequence builder to reconstruct the copying path.
/// A traceback belongs to exactly one query; concurrent queries each own one.
pub struct Traceback {
    sites: Vec<Vec<TracebackSegment>>,
    segment_block_size: usize,
}

impl Traceback {
    /// Create an empty traceback over the given number of sites.
    pub fn new(num_sites: usize) -> Self {
        Self::with_block_size(num_sites, 64)
    }

    /// Create an empty traceback whose per-site lists reserve
    /// `segment_block_size` entries on first use.
    pub fn with_block_size(num_sites: usize, segment_block_size: usize) -> Self {
        Self {
            sites: vec![Vec::new(); num_sites],
            segment_block_size,
        }
    }

    /// The number of sites the traceback spans.
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Record that the copying path recombines to `ancestor` when the parent
    /// at `site` lies in `[start, end)`. Records must be appended in
    /// increasing `start` order per site; adjacent records with the same
    /// target ancestor coalesce.
    pub fn add_recombination(
        &mut self,
        site: VariantIndex,
        start: usize,
        end: usize,
        ancestor: Ancestor,
    ) {
        debug_assert!(start < end);
        let records = &mut self.sites[site.0];
        match records.last_mut() {
            Some(last) if last.end == start && last.ancestor == ancestor => last.end = end,
            _ => {
                if records.is_empty() {
                    records.reserve(self.segment_block_size);
                }
                records.push(TracebackSegment {
                    start,
                    end,
                    ancestor,
                });
            }
        }
    }

    /// Clear all recombination records while keeping the allocations for
    /// reuse by the next query.
    pub fn reset(&mut self) {
        for site in &mut self.sites {
            site.clear();
        }
    }

    /// Look up the recombination target at `site` for the given current
    /// parent. Returns `None` if the path does not recombine there.
    pub fn parent_switch(&self, site: VariantIndex, current: Ancestor) -> Option<Ancestor> {
        let records = &self.sites[site.0];
        let index = records.partition_point(|record| record.start <= current.0);
        if index == 0 {
            return None;
        }
        let record = &records[index - 1];
        (current.0 < record.end).then_some(record.ancestor)
    }

    /// The recombination records at a single site.
    pub fn site_segments(&self, site: VariantIndex) -> &[TracebackSegment] {
        &self.sites[site.0]
    }

    /// The total number of records over all sites.
    pub fn num_segments(&self) -> usize {
        self.sites.iter().map(|site| site.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_adjacent_records() {
        let mut traceback = Traceback::new(2);
        traceback.add_recombination(VariantIndex(0), 0, 2, Ancestor(4));
        traceback.add_recombination(VariantIndex(0), 2, 5, Ancestor(4));
        traceback.add_recombination(VariantIndex(0), 5, 6, Ancestor(1));

        assert_eq!(
            traceback.site_segments(VariantIndex(0)),
            [
                TracebackSegment {
                    start: 0,
                    end: 5,
                    ancestor: Ancestor(4)
                },
                TracebackSegment {
                    start: 5,
                    end: 6,
                    ancestor: Ancestor(1)
                },
            ]
        );
    }

    #[test]
    fn parent_switch_lookup() {
        let mut traceback = Traceback::new(3);
        traceback.add_recombination(VariantIndex(1), 1, 3, Ancestor(7));

        assert_eq!(traceback.parent_switch(VariantIndex(1), Ancestor(0)), None);
        assert_eq!(
            traceback.parent_switch(VariantIndex(1), Ancestor(1)),
            Some(Ancestor(7))
        );
        assert_eq!(
            traceback.parent_switch(VariantIndex(1), Ancestor(2)),
            Some(Ancestor(7))
        );
        assert_eq!(traceback.parent_switch(VariantIndex(1), Ancestor(3)), None);
        assert_eq!(traceback.parent_switch(VariantIndex(0), Ancestor(1)), None);
    }

    #[test]
    fn reset_keeps_site_count() {
        let mut traceback = Traceback::new(2);
        traceback.add_recombination(VariantIndex(0), 0, 1, Ancestor(0));
        traceback.reset();

        assert_eq!(traceback.num_segments(), 0);
        assert_eq!(traceback.num_sites(), 2);
        assert_eq!(traceback.parent_switch(VariantIndex(0), Ancestor(0)), None);
    }
}
