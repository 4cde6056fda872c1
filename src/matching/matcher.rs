use crate::ancestors::Ancestor;
use crate::error::{InferenceError, Result};
use crate::matching::Traceback;
use crate::store::AncestorStore;
use crate::variants::{Allele, VariantIndex, DERIVED_STATE, UNKNOWN_STATE};

/// A run of ancestors sharing one likelihood value at the current site of the
/// copying model.
#[derive(Copy, Clone, Debug)]
struct LikelihoodSegment {
    start: usize,
    end: usize,
    likelihood: f64,
}

/// Computes maximum-likelihood copying paths through the ancestor store under
/// the Li–Stephens model. A query haplotype is modeled as a recombining,
/// occasionally mismatching copy of the stored ancestors that are strictly
/// older than the query.
///
/// Instead of one likelihood per ancestor, the matcher keeps a list of value
/// runs over ancestor ids, refined at each site against the store's allele
/// runs, so the work per site is proportional to the number of runs rather
/// than the number of ancestors.
pub struct AncestorMatcher<'a> {
    store: &'a AncestorStore,
    recombination_rate: f64,
}

impl<'a> AncestorMatcher<'a> {
    /// Create a matcher over the given store.
    pub fn new(store: &'a AncestorStore, recombination_rate: f64) -> Self {
        Self {
            store,
            recombination_rate,
        }
    }

    /// The store this matcher reads from.
    pub fn store(&self) -> &AncestorStore {
        self.store
    }

    /// Compute the maximum-likelihood copying path for a query haplotype over
    /// the `num_ancestors` oldest ancestors in the store.
    ///
    /// Recombination records are written into the supplied traceback; the
    /// returned ancestor is the best copying parent at the last matched site,
    /// from which the full path can be reconstructed by walking the traceback
    /// backwards.
    ///
    /// # Parameters
    /// - `num_ancestors`: the number of eligible parents; only ancestors with
    ///   ids below this take part in the match
    /// - `haplotype`: query alleles indexed by site over the full site range
    /// - `start_site`, `end_site`: the site interval the query is defined on
    /// - `focal_sites`: sorted sites at which the query carries the derived
    ///   allele by construction; parents disagreeing there are excluded
    /// - `error_rate`: per-site mismatch probability
    /// - `traceback`: recombination record sink, cleared by the caller
    pub fn best_path(
        &self,
        num_ancestors: usize,
        haplotype: &[Allele],
        start_site: VariantIndex,
        end_site: VariantIndex,
        focal_sites: &[VariantIndex],
        error_rate: f64,
        traceback: &mut Traceback,
    ) -> Result<Ancestor> {
        if num_ancestors == 0 {
            return Err(InferenceError::NoEligibleParents);
        }
        if start_site >= end_site {
            return Err(InferenceError::invalid_data("empty query interval"));
        }
        debug_assert!(num_ancestors <= self.store.num_ancestors());
        debug_assert!(focal_sites.windows(2).all(|sites| sites[0] < sites[1]));

        let k = num_ancestors as f64;
        let rho = self.recombination_rate;
        let mu = error_rate;
        // probability that one specific ancestor recombines onto the current
        // one, and that the current ancestor is retained
        let prob_recomb = rho / k;
        let prob_no_recomb = 1.0 - rho + rho / k;
        let rev_mu = 1.0 - mu;

        let mut current = vec![LikelihoodSegment {
            start: 0,
            end: num_ancestors,
            likelihood: 1.0,
        }];
        let mut next: Vec<LikelihoodSegment> = Vec::with_capacity(16);

        for site_index in start_site.0..end_site.0 {
            let site = VariantIndex(site_index);
            let (max_likelihood, best_ancestor) = Self::max_segment(&current);
            if max_likelihood <= 0.0 {
                return Err(InferenceError::NumericUnderflow { site: site_index });
            }

            // normalization against the previous site's maximum keeps the
            // values in (0, 1] and lets the recombination branch use the
            // constant rho / k
            for segment in &mut current {
                segment.likelihood /= max_likelihood;
            }

            let query_state = haplotype[site_index];
            let is_focal = focal_sites.binary_search(&site).is_ok();
            let runs = self.store.site_segments(site);

            // piecewise intersection of the likelihood runs with the store's
            // allele runs at this site
            next.clear();
            let mut value_index = 0;
            let mut run_index = 0;
            while value_index < current.len() && run_index < runs.len() {
                let segment = current[value_index];
                let run = runs[run_index];

                let piece_start = segment.start.max(run.start);
                let piece_end = segment.end.min(run.end);

                if run.end >= segment.end {
                    value_index += 1;
                }
                if run.end <= segment.end {
                    run_index += 1;
                }
                if piece_start >= piece_end {
                    continue;
                }

                let no_recomb = segment.likelihood * prob_no_recomb;
                let transitioned = if no_recomb >= prob_recomb {
                    no_recomb
                } else {
                    traceback.add_recombination(site, piece_start, piece_end, best_ancestor);
                    prob_recomb
                };

                let likelihood = if run.state == UNKNOWN_STATE {
                    // the parent is not defined here, it cannot be copied from
                    0.0
                } else if is_focal {
                    if run.state == DERIVED_STATE {
                        transitioned
                    } else {
                        0.0
                    }
                } else if run.state == query_state {
                    transitioned * rev_mu
                } else {
                    transitioned * mu
                };

                Self::push_coalescing(&mut next, piece_start, piece_end, likelihood);
            }

            std::mem::swap(&mut current, &mut next);
        }

        let (max_likelihood, best_ancestor) = Self::max_segment(&current);
        if max_likelihood <= 0.0 {
            return Err(InferenceError::NumericUnderflow {
                site: end_site.0 - 1,
            });
        }
        Ok(best_ancestor)
    }

    /// Find the maximum likelihood over the segments and a representative
    /// ancestor carrying it: the last (youngest) id of the last maximal run.
    fn max_segment(segments: &[LikelihoodSegment]) -> (f64, Ancestor) {
        let mut max_likelihood = -1.0;
        let mut best_ancestor = 0;
        for segment in segments {
            if segment.likelihood >= max_likelihood {
                max_likelihood = segment.likelihood;
                best_ancestor = segment.end - 1;
            }
        }
        (max_likelihood, Ancestor(best_ancestor))
    }

    /// Append a value run, merging it into the previous run if both carry the
    /// same likelihood.
    fn push_coalescing(segments: &mut Vec<LikelihoodSegment>, start: usize, end: usize, likelihood: f64) {
        match segments.last_mut() {
            Some(last) if last.end == start && last.likelihood == likelihood => last.end = end,
            _ => segments.push(LikelihoodSegment {
                start,
                end,
                likelihood,
            }),
        }
    }
}
