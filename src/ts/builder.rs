use crate::ancestors::Ancestor;
use crate::config::InferenceConfig;
use crate::error::{InferenceError, Result};
use crate::matching::Traceback;
use crate::store::AncestorStore;
use crate::ts::segment_list::SegmentList;
use crate::variants::{Allele, VariantIndex, ANCESTRAL_STATE, UNKNOWN_STATE};
use tracing::debug;

/// A copying interval queued by [`TreeSequenceBuilder::update`] until the
/// epoch is resolved: `child` copies from `parent` over `[left, right)`.
#[derive(Clone, Debug)]
struct ChildMapping {
    left: VariantIndex,
    right: VariantIndex,
    parent: Ancestor,
    child: usize,
}

/// An interval over which a parent has a fixed set of children. The parent is
/// implicit (edgesets are stored per parent); intervals of one parent are
/// pairwise disjoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edgeset {
    pub left: VariantIndex,
    pub right: VariantIndex,
    pub children: Vec<usize>,
}

/// A single mutation at a site: the branch leading to `node` changes the
/// allele to `derived_state`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MutationRecord {
    pub node: usize,
    pub derived_state: Allele,
}

/// Resolves copying paths into a consistent forest of edgesets and mutations.
///
/// Node ids extend the ancestor ids: nodes `[0, A)` are the ancestors, nodes
/// `[A, A + num_samples)` are the samples. Updates queue per-child copying
/// intervals; the epoch-barrier [`resolve`] turns them into edgesets and
/// maintains the per-ancestor live segments that younger generations build
/// upon.
///
/// [`resolve`]: TreeSequenceBuilder::resolve
pub struct TreeSequenceBuilder<'a> {
    store: &'a AncestorStore,
    num_samples: usize,
    node_flags: Vec<u32>,
    node_time: Vec<f64>,
    /// copying intervals queued since the last resolve
    pending: Vec<ChildMapping>,
    /// resolved edgesets, indexed by parent ancestor
    edgesets: Vec<Vec<Edgeset>>,
    /// mutations per site, in resolution order
    mutations: Vec<Vec<MutationRecord>>,
    /// intervals on which each ancestor is the youngest representative of its
    /// lineage
    live_segments: Vec<SegmentList>,
    /// matched interval of each ancestor, recorded at update time
    matched_intervals: Vec<Option<(VariantIndex, VariantIndex)>>,
    edgeset_block_size: usize,
    mutation_block_size: usize,
}

impl<'a> TreeSequenceBuilder<'a> {
    /// Create a builder over the given store for `num_samples` sample nodes.
    pub fn new(store: &'a AncestorStore, num_samples: usize, config: &InferenceConfig) -> Self {
        let num_ancestors = store.num_ancestors();
        let num_nodes = num_ancestors + num_samples;
        let num_sites = store.num_sites();

        let mut node_flags = vec![0u32; num_nodes];
        let mut node_time = vec![0f64; num_nodes];
        for ancestor in 0..num_ancestors {
            node_time[ancestor] = store.age(Ancestor(ancestor)) as f64;
        }
        for sample in num_ancestors..num_nodes {
            node_flags[sample] = 1;
        }

        // the root is live everywhere before anything has been matched
        let mut live_segments = vec![SegmentList::new(); num_ancestors];
        if num_sites > 0 {
            live_segments[0].append(VariantIndex(0), VariantIndex(num_sites));
        }

        Self {
            store,
            num_samples,
            node_flags,
            node_time,
            pending: Vec::with_capacity(config.node_mapping_block_size),
            edgesets: vec![Vec::new(); num_ancestors],
            mutations: vec![Vec::new(); num_sites],
            live_segments,
            matched_intervals: vec![None; num_ancestors],
            edgeset_block_size: config.edgeset_block_size,
            mutation_block_size: config.mutation_list_node_block_size,
        }
    }

    /// The total number of nodes (ancestors plus samples).
    pub fn num_nodes(&self) -> usize {
        self.node_time.len()
    }

    /// The number of sample nodes.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// The number of resolved edgesets.
    pub fn num_edgesets(&self) -> usize {
        self.edgesets.iter().map(|e| e.len()).sum()
    }

    /// The number of emitted mutations.
    pub fn num_mutations(&self) -> usize {
        self.mutations.iter().map(|m| m.len()).sum()
    }

    /// Consume the copying path of one query: walk the traceback backwards
    /// into a piecewise-constant parent sequence, queue one copying interval
    /// per parent, and emit a mutation wherever the child's haplotype
    /// disagrees with the chosen parent.
    ///
    /// # Parameters
    /// - `child`: the node id of the query (ancestor id, or
    ///   `num_ancestors + sample_index` for samples)
    /// - `haplotype`: the query's alleles, indexed by site
    /// - `start_site`, `end_site`: the interval the query was matched on
    /// - `end_site_parent`: the best copying parent at `end_site - 1`
    /// - `traceback`: the recombination records of the query's match
    pub fn update(
        &mut self,
        child: usize,
        haplotype: &[Allele],
        start_site: VariantIndex,
        end_site: VariantIndex,
        end_site_parent: Ancestor,
        traceback: &Traceback,
    ) -> Result<()> {
        if start_site >= end_site {
            return Err(InferenceError::invalid_data("empty copying interval"));
        }
        if child >= self.num_nodes() {
            return Err(InferenceError::invalid_data(format!(
                "child node {child} does not exist"
            )));
        }

        let mut current_parent = end_site_parent;
        let mut interval_end = end_site;

        for site_index in (start_site.0..end_site.0).rev() {
            let site = VariantIndex(site_index);
            self.check_topology(current_parent, child)?;

            // disagreements with the copied parent become mutations on the
            // branch leading to the child
            let parent_state = match self.store.get_state(site, current_parent) {
                UNKNOWN_STATE => ANCESTRAL_STATE,
                state => state,
            };
            if haplotype[site_index] != parent_state {
                let mutations = &mut self.mutations[site_index];
                if mutations.is_empty() {
                    mutations.reserve(self.mutation_block_size);
                }
                mutations.push(MutationRecord {
                    node: child,
                    derived_state: haplotype[site_index],
                });
            }

            if site_index > start_site.0 {
                if let Some(switch) = traceback.parent_switch(site, current_parent) {
                    if switch != current_parent {
                        self.pending.push(ChildMapping {
                            left: site,
                            right: interval_end,
                            parent: current_parent,
                            child,
                        });
                        current_parent = switch;
                        interval_end = site;
                    }
                }
            }
        }

        self.check_topology(current_parent, child)?;
        self.pending.push(ChildMapping {
            left: start_site,
            right: interval_end,
            parent: current_parent,
            child,
        });

        if child < self.store.num_ancestors() {
            self.matched_intervals[child] = Some((start_site, end_site));
        }

        Ok(())
    }

    /// A parent must be strictly older than its child; for ancestor children
    /// this also means a strictly smaller id.
    fn check_topology(&self, parent: Ancestor, child: usize) -> Result<()> {
        if parent.0 >= self.store.num_ancestors() {
            return Err(InferenceError::invariant(format!(
                "node {} copies from {}, which is not an ancestor",
                child, parent.0
            )));
        }
        if self.node_time[parent.0] <= self.node_time[child] || parent.0 >= child {
            return Err(InferenceError::invariant(format!(
                "node {} copies from {} which is not strictly older",
                child, parent.0
            )));
        }
        Ok(())
    }

    /// Resolve all queries submitted since the previous resolve. `children`
    /// are the node ids matched in this epoch.
    ///
    /// Pending copying intervals are grouped by parent; each touched parent's
    /// edgeset list is rebuilt from its existing edgesets plus the new
    /// intervals, split at every breakpoint, with child sets unioned per
    /// piece and adjacent pieces with equal child sets coalesced. Newly
    /// resolved ancestors become live over their matched interval, and every
    /// copied interval is subtracted from its parent's live segments.
    pub fn resolve(&mut self, epoch: usize, children: &[usize]) -> Result<()> {
        debug!(
            epoch,
            num_children = children.len(),
            num_mappings = self.pending.len(),
            "resolving epoch"
        );

        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_unstable_by_key(|m| (m.parent.0, m.left.0, m.right.0, m.child));

        let mut group_start = 0;
        while group_start < pending.len() {
            let parent = pending[group_start].parent;
            let group_end = pending[group_start..]
                .iter()
                .position(|m| m.parent != parent)
                .map(|offset| group_start + offset)
                .unwrap_or(pending.len());

            self.rebuild_edgesets(parent, &pending[group_start..group_end]);
            group_start = group_end;
        }

        // the children of this epoch become the youngest representatives of
        // their lineage on their matched intervals
        for &child in children {
            if child < self.store.num_ancestors() {
                if let Some((start, end)) = self.matched_intervals[child] {
                    self.live_segments[child].clear();
                    self.live_segments[child].append(start, end);
                }
            }
        }
        for mapping in &pending {
            self.live_segments[mapping.parent.0].subtract(mapping.left, mapping.right);
        }

        // keep the drained buffer's allocation for the next epoch
        pending.clear();
        self.pending = pending;

        Ok(())
    }

    /// Rebuild one parent's edgeset list from its current edgesets and the
    /// newly queued copying intervals.
    fn rebuild_edgesets(&mut self, parent: Ancestor, additions: &[ChildMapping]) {
        let existing = std::mem::take(&mut self.edgesets[parent.0]);

        let mut bounds: Vec<usize> = existing
            .iter()
            .flat_map(|e| [e.left.0, e.right.0])
            .chain(additions.iter().flat_map(|m| [m.left.0, m.right.0]))
            .collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut result: Vec<Edgeset> = Vec::with_capacity(self.edgeset_block_size.min(bounds.len()));
        for window in bounds.windows(2) {
            let (left, right) = (window[0], window[1]);

            let mut children: Vec<usize> = existing
                .iter()
                .filter(|e| e.left.0 <= left && right <= e.right.0)
                .flat_map(|e| e.children.iter().copied())
                .chain(
                    additions
                        .iter()
                        .filter(|m| m.left.0 <= left && right <= m.right.0)
                        .map(|m| m.child),
                )
                .collect();
            if children.is_empty() {
                continue;
            }
            children.sort_unstable();
            children.dedup();

            match result.last_mut() {
                Some(last) if last.right.0 == left && last.children == children => {
                    last.right = VariantIndex(right);
                }
                _ => result.push(Edgeset {
                    left: VariantIndex(left),
                    right: VariantIndex(right),
                    children,
                }),
            }
        }

        self.edgesets[parent.0] = result;
    }

    /// The intervals on which `parent` is currently the youngest
    /// representative of its lineage. Callers can use this to restrict
    /// younger queries to regions where viable parents exist.
    pub fn get_live_segments(&self, parent: Ancestor) -> &SegmentList {
        &self.live_segments[parent.0]
    }

    /// The tightest interval within `[start, end)` on which any of the
    /// `num_ancestors` oldest ancestors is live. The driver restricts every
    /// query to this range before matching, since only live ancestors are
    /// viable copying parents. Returns `None` when no eligible parent is
    /// live anywhere in the query interval.
    pub fn live_range(
        &self,
        num_ancestors: usize,
        start: VariantIndex,
        end: VariantIndex,
    ) -> Option<(VariantIndex, VariantIndex)> {
        let mut range: Option<(VariantIndex, VariantIndex)> = None;
        for parent in self.live_segments.iter().take(num_ancestors) {
            for segment in parent.iter() {
                if segment.end <= start || segment.start >= end {
                    continue;
                }
                let clamped = (segment.start.max(start), segment.end.min(end));
                range = match range {
                    Some((live_start, live_end)) => {
                        Some((live_start.min(clamped.0), live_end.max(clamped.1)))
                    }
                    None => Some(clamped),
                };
            }
        }
        range
    }

    /// Dump the node table as parallel arrays: flags (1 for samples, 0 for
    /// internal nodes) and times (the integer age, as a float).
    pub fn dump_nodes(&self) -> (Vec<u32>, Vec<f64>) {
        (self.node_flags.clone(), self.node_time.clone())
    }

    /// Dump the edgeset table as parallel arrays, youngest parents first so
    /// that times are nondecreasing. Interval bounds are converted from site
    /// ids to genome positions; the flattened children array is described by
    /// `children_length`.
    pub fn dump_edgesets(&self) -> (Vec<f64>, Vec<f64>, Vec<usize>, Vec<usize>, Vec<u32>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut parent = Vec::new();
        let mut children = Vec::new();
        let mut children_length = Vec::new();

        // smaller ids are older, so reverse id order sorts by time
        for parent_id in (0..self.store.num_ancestors()).rev() {
            for edgeset in &self.edgesets[parent_id] {
                left.push(self.store.variant_index_to_position(edgeset.left).unwrap());
                right.push(self.store.variant_index_to_position(edgeset.right).unwrap());
                parent.push(parent_id);
                children.extend_from_slice(&edgeset.children);
                children_length.push(edgeset.children.len() as u32);
            }
        }

        (left, right, parent, children, children_length)
    }

    /// Dump the mutation table as parallel arrays in site order.
    pub fn dump_mutations(&self) -> (Vec<usize>, Vec<usize>, Vec<Allele>) {
        let mut site = Vec::new();
        let mut node = Vec::new();
        let mut derived_state = Vec::new();

        for (site_index, records) in self.mutations.iter().enumerate() {
            for record in records {
                site.push(site_index);
                node.push(record.node);
                derived_state.push(record.derived_state);
            }
        }

        (site, node, derived_state)
    }

    /// The resolved edgesets of one parent, sorted by interval start.
    pub fn parent_edgesets(&self, parent: Ancestor) -> &[Edgeset] {
        &self.edgesets[parent.0]
    }

    /// The mutations recorded at one site.
    pub fn site_mutations(&self, site: VariantIndex) -> &[MutationRecord] {
        &self.mutations[site.0]
    }
}
