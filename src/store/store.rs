use crate::ancestors::{Ancestor, AncestralSequence};
use crate::error::{InferenceError, Result};
use crate::store::{AlleleSegment, AncestorStoreBuilder};
use crate::variants::{Allele, SequencePosition, VariantIndex, ANCESTRAL_STATE};

/// The contiguous ancestor id range of one epoch. Epochs are indexed oldest
/// first, so epoch 0 holds exactly the universal root ancestor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EpochSpan {
    pub(crate) first_ancestor: usize,
    pub(crate) num_ancestors: usize,
}

impl EpochSpan {
    /// The id of the first ancestor of this epoch.
    pub fn first_ancestor(&self) -> Ancestor {
        Ancestor(self.first_ancestor)
    }

    /// The number of ancestors in this epoch.
    pub fn num_ancestors(&self) -> usize {
        self.num_ancestors
    }
}

/// A single ancestor materialized from the store.
#[derive(Clone, Debug)]
pub struct AncestorView {
    /// Alleles over the full site range; sites outside `[start, end)` carry
    /// the ancestral state.
    pub alleles: Vec<Allele>,
    /// First site the ancestor is defined on (inclusive)
    pub start: VariantIndex,
    /// Last site the ancestor is defined on (exclusive)
    pub end: VariantIndex,
    /// Number of ancestors with strictly greater age
    pub num_older_ancestors: usize,
    /// The focal sites the ancestor was built for
    pub focal_sites: Vec<VariantIndex>,
}

/// Immutable, random-access view of the ancestor-by-site allele matrix,
/// stored as per-site runs over ancestor ids in one contiguous buffer.
/// The store is created once from the [`AncestorStoreBuilder`] output and is
/// then shared read-only by all matchers.
pub struct AncestorStore {
    positions: Vec<SequencePosition>,
    sequence_length: SequencePosition,
    segments: Vec<AlleleSegment>,
    /// per-site offsets into the segment buffer, `num_sites + 1` entries
    site_offsets: Vec<usize>,
    ages: Vec<u32>,
    num_older_ancestors: Vec<usize>,
    starts: Vec<VariantIndex>,
    ends: Vec<VariantIndex>,
    /// focal sites of all ancestors, flattened
    focal_sites: Vec<VariantIndex>,
    /// per-ancestor offsets into the focal site buffer, `num_ancestors + 1`
    /// entries
    focal_site_offsets: Vec<usize>,
    epochs: Vec<EpochSpan>,
}

impl AncestorStore {
    /// Create a store from flattened segment arrays (sorted by `(site,
    /// start)`, as produced by [`AncestorStoreBuilder::dump`]) and the
    /// per-ancestor metadata.
    ///
    /// Construction validates the store invariants: at every site the runs
    /// must partition the ancestor id range without gap or overlap, and ages
    /// must be nonincreasing in ancestor id.
    pub fn new(
        positions: Vec<SequencePosition>,
        sequence_length: SequencePosition,
        ages: Vec<u32>,
        intervals: Vec<(VariantIndex, VariantIndex)>,
        focal_sites: Vec<Vec<VariantIndex>>,
        segments: (Vec<usize>, Vec<usize>, Vec<usize>, Vec<Allele>),
    ) -> Result<Self> {
        let num_sites = positions.len();
        let num_ancestors = ages.len();
        if num_ancestors == 0 {
            return Err(InferenceError::invalid_data("store contains no ancestors"));
        }
        if intervals.len() != num_ancestors || focal_sites.len() != num_ancestors {
            return Err(InferenceError::invalid_data(
                "per-ancestor metadata arrays disagree in length",
            ));
        }

        let (segment_sites, segment_starts, segment_ends, segment_states) = segments;
        if segment_starts.len() != segment_sites.len()
            || segment_ends.len() != segment_sites.len()
            || segment_states.len() != segment_sites.len()
        {
            return Err(InferenceError::invalid_data(
                "segment arrays disagree in length",
            ));
        }

        let mut segment_buffer = Vec::with_capacity(segment_sites.len());
        let mut site_offsets = vec![0usize; num_sites + 1];

        let mut current_site = 0;
        let mut expected_start = 0;
        for (index, &site) in segment_sites.iter().enumerate() {
            if site >= num_sites || site < current_site {
                return Err(InferenceError::invariant(format!(
                    "segment dump not sorted by site (site {site} at index {index})"
                )));
            }
            while current_site < site {
                if expected_start != num_ancestors {
                    return Err(InferenceError::invariant(format!(
                        "segments at site {current_site} cover [0, {expected_start}) instead of [0, {num_ancestors})"
                    )));
                }
                current_site += 1;
                site_offsets[current_site] = index;
                expected_start = 0;
            }

            if segment_starts[index] != expected_start || segment_ends[index] <= segment_starts[index]
            {
                return Err(InferenceError::invariant(format!(
                    "segment [{}, {}) at site {site} breaks the partition of the ancestor range",
                    segment_starts[index], segment_ends[index]
                )));
            }
            expected_start = segment_ends[index];
            segment_buffer.push(AlleleSegment::new(
                segment_starts[index],
                segment_ends[index],
                segment_states[index],
            ));
        }
        while current_site < num_sites {
            if expected_start != num_ancestors {
                return Err(InferenceError::invariant(format!(
                    "segments at site {current_site} cover [0, {expected_start}) instead of [0, {num_ancestors})"
                )));
            }
            current_site += 1;
            site_offsets[current_site] = segment_buffer.len();
            expected_start = 0;
        }

        let epochs = Self::index_epochs(&ages)?;
        let mut num_older_ancestors = vec![0usize; num_ancestors];
        for epoch in &epochs {
            for ancestor in epoch.first_ancestor..epoch.first_ancestor + epoch.num_ancestors {
                num_older_ancestors[ancestor] = epoch.first_ancestor;
            }
        }

        let mut focal_site_offsets = Vec::with_capacity(num_ancestors + 1);
        focal_site_offsets.push(0);
        let mut flat_focal_sites = Vec::new();
        for sites in &focal_sites {
            flat_focal_sites.extend_from_slice(sites);
            focal_site_offsets.push(flat_focal_sites.len());
        }

        let (starts, ends) = intervals.into_iter().unzip();

        Ok(Self {
            positions,
            sequence_length,
            segments: segment_buffer,
            site_offsets,
            ages,
            num_older_ancestors,
            starts,
            ends,
            focal_sites: flat_focal_sites,
            focal_site_offsets,
            epochs,
        })
    }

    /// Build the store directly from generated ancestral sequences, which
    /// must be ordered oldest first.
    pub fn from_ancestors(
        positions: Vec<SequencePosition>,
        sequence_length: SequencePosition,
        ancestors: &[AncestralSequence],
        segment_block_size: usize,
    ) -> Result<Self> {
        let num_sites = positions.len();
        let mut builder = AncestorStoreBuilder::with_block_size(num_sites, segment_block_size);
        for ancestor in ancestors {
            builder.add(ancestor.full_state())?;
        }

        Self::new(
            positions,
            sequence_length,
            ancestors.iter().map(|a| a.age()).collect(),
            ancestors.iter().map(|a| (a.start(), a.end())).collect(),
            ancestors.iter().map(|a| a.focal_sites().to_vec()).collect(),
            builder.dump(),
        )
    }

    /// Group ancestors into epochs of equal age. Ages must be nonincreasing
    /// in ancestor id, so each epoch is a contiguous id range.
    fn index_epochs(ages: &[u32]) -> Result<Vec<EpochSpan>> {
        let mut epochs: Vec<EpochSpan> = Vec::new();
        let mut current_age = None;
        for (ancestor, &age) in ages.iter().enumerate() {
            match current_age {
                Some(current) if age == current => {
                    epochs.last_mut().unwrap().num_ancestors += 1;
                }
                Some(current) if age > current => {
                    return Err(InferenceError::invariant(format!(
                        "ancestor {ancestor} is older than its predecessor (age {age} > {current})"
                    )));
                }
                _ => {
                    epochs.push(EpochSpan {
                        first_ancestor: ancestor,
                        num_ancestors: 1,
                    });
                    current_age = Some(age);
                }
            }
        }
        Ok(epochs)
    }

    /// The allele of `ancestor` at `site`. Performs a binary search over the
    /// runs at the site.
    pub fn get_state(&self, site: VariantIndex, ancestor: Ancestor) -> Allele {
        let runs = self.site_segments(site);
        let index = runs.partition_point(|run| run.start <= ancestor.0) - 1;
        debug_assert!(runs[index].contains(ancestor.0));
        runs[index].state
    }

    /// Materialize the full allele vector of an ancestor together with its
    /// metadata. Sites outside the ancestor's defined interval are emitted as
    /// the ancestral state.
    pub fn get_ancestor(&self, ancestor: Ancestor) -> AncestorView {
        let start = self.starts[ancestor.0];
        let end = self.ends[ancestor.0];
        let mut alleles = vec![ANCESTRAL_STATE; self.num_sites()];
        for site in start.0..end.0 {
            alleles[site] = self.get_state(VariantIndex(site), ancestor);
        }

        AncestorView {
            alleles,
            start,
            end,
            num_older_ancestors: self.num_older_ancestors[ancestor.0],
            focal_sites: self.focal_sites(ancestor).to_vec(),
        }
    }

    /// The ancestor ids of one epoch. Epoch 0 is the oldest and holds only
    /// the universal root.
    pub fn get_epoch_ancestors(&self, epoch: usize) -> Vec<Ancestor> {
        let span = &self.epochs[epoch];
        (span.first_ancestor..span.first_ancestor + span.num_ancestors)
            .map(Ancestor)
            .collect()
    }

    /// The number of epochs, including the root epoch.
    pub fn num_epochs(&self) -> usize {
        self.epochs.len()
    }

    /// The epoch spans, oldest first.
    pub fn epochs(&self) -> &[EpochSpan] {
        &self.epochs
    }

    /// The number of sites the store spans.
    pub fn num_sites(&self) -> usize {
        self.positions.len()
    }

    /// The number of ancestors in the store.
    pub fn num_ancestors(&self) -> usize {
        self.ages.len()
    }

    /// The total number of allele runs over all sites.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// The age of an ancestor (older = larger).
    pub fn age(&self, ancestor: Ancestor) -> u32 {
        self.ages[ancestor.0]
    }

    /// The number of ancestors strictly older than the given one.
    pub fn num_older_ancestors(&self, ancestor: Ancestor) -> usize {
        self.num_older_ancestors[ancestor.0]
    }

    /// The interval `[start, end)` of sites the ancestor is defined on.
    pub fn interval(&self, ancestor: Ancestor) -> (VariantIndex, VariantIndex) {
        (self.starts[ancestor.0], self.ends[ancestor.0])
    }

    /// The focal sites the ancestor was built for.
    pub fn focal_sites(&self, ancestor: Ancestor) -> &[VariantIndex] {
        &self.focal_sites
            [self.focal_site_offsets[ancestor.0]..self.focal_site_offsets[ancestor.0 + 1]]
    }

    /// The allele runs at a single site, sorted by run start.
    pub fn site_segments(&self, site: VariantIndex) -> &[AlleleSegment] {
        &self.segments[self.site_offsets[site.0]..self.site_offsets[site.0 + 1]]
    }

    /// The genome positions of all sites.
    pub fn positions(&self) -> &[SequencePosition] {
        &self.positions
    }

    /// The genome length.
    pub fn sequence_length(&self) -> SequencePosition {
        self.sequence_length
    }

    /// Convert a variant index into a genome position. The first site index
    /// maps to the genome start and the one-past-the-end index to the genome
    /// length, so intervals of site indices widen to full genome intervals.
    pub fn variant_index_to_position(&self, index: VariantIndex) -> SequencePosition {
        if index.0 == 0 {
            SequencePosition::from_f64(0.0)
        } else if index.0 == self.positions.len() {
            self.sequence_length
        } else {
            self.positions[index.0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> AncestorStore {
        // three ancestors over four sites: the root and two younger epochs
        let mut builder = AncestorStoreBuilder::new(4);
        builder.add(&[0, 0, 0, 0]).unwrap();
        builder.add(&[1, 1, 0, 0]).unwrap();
        builder.add(&[-1, 0, 1, 1]).unwrap();

        AncestorStore::new(
            SequencePosition::from_vec(vec![1.0, 2.0, 3.0, 4.0]),
            SequencePosition::from_f64(10.0),
            vec![3, 2, 1],
            vec![
                (VariantIndex(0), VariantIndex(4)),
                (VariantIndex(0), VariantIndex(4)),
                (VariantIndex(1), VariantIndex(4)),
            ],
            vec![
                vec![],
                vec![VariantIndex(0), VariantIndex(1)],
                vec![VariantIndex(2)],
            ],
            builder.dump(),
        )
        .unwrap()
    }

    #[test]
    fn state_lookup_matches_input() {
        let store = sample_store();
        let expected = [[0, 0, 0, 0], [1, 1, 0, 0], [-1, 0, 1, 1]];
        for (ancestor, haplotype) in expected.iter().enumerate() {
            for (site, &state) in haplotype.iter().enumerate() {
                assert_eq!(
                    store.get_state(VariantIndex(site), Ancestor(ancestor)),
                    state
                );
            }
        }
    }

    #[test]
    fn ancestor_round_trip() {
        let store = sample_store();
        for ancestor in 0..store.num_ancestors() {
            let view = store.get_ancestor(Ancestor(ancestor));
            for site in view.start.0..view.end.0 {
                assert_eq!(
                    view.alleles[site],
                    store.get_state(VariantIndex(site), Ancestor(ancestor))
                );
            }
            // outside the defined interval the view holds the ancestral state
            for site in 0..view.start.0 {
                assert_eq!(view.alleles[site], ANCESTRAL_STATE);
            }
        }
    }

    #[test]
    fn epoch_index() {
        let store = sample_store();
        assert_eq!(store.num_epochs(), 3);
        assert_eq!(store.get_epoch_ancestors(0), [Ancestor(0)]);
        assert_eq!(store.get_epoch_ancestors(1), [Ancestor(1)]);
        assert_eq!(store.get_epoch_ancestors(2), [Ancestor(2)]);
        assert_eq!(store.num_older_ancestors(Ancestor(2)), 2);
    }

    #[test]
    fn rejects_broken_partition() {
        // the segment at site 0 misses ancestor 1
        let result = AncestorStore::new(
            SequencePosition::from_vec(vec![1.0]),
            SequencePosition::from_f64(2.0),
            vec![1, 1],
            vec![(VariantIndex(0), VariantIndex(1)); 2],
            vec![vec![]; 2],
            (vec![0], vec![0], vec![1], vec![0]),
        );
        assert!(matches!(
            result,
            Err(crate::error::InferenceError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn rejects_increasing_ages() {
        let mut builder = AncestorStoreBuilder::new(1);
        builder.add(&[0]).unwrap();
        builder.add(&[1]).unwrap();

        let result = AncestorStore::new(
            SequencePosition::from_vec(vec![1.0]),
            SequencePosition::from_f64(2.0),
            vec![1, 2],
            vec![(VariantIndex(0), VariantIndex(1)); 2],
            vec![vec![]; 2],
            builder.dump(),
        );
        assert!(result.is_err());
    }
}
