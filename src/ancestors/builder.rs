use crate::ancestors::AncestralSequence;
use crate::error::{InferenceError, Result};
use crate::variants::{
    Allele, VariantData, VariantIndex, VariantSite, ANCESTRAL_STATE, DERIVED_STATE,
};
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use tracing::debug;
use twox_hash::XxHash64;

/// Synthesizes ancestral haplotypes from a panel of variant sites. Sites are
/// grouped into frequency classes (sites with the same derived-allele count
/// among the samples); every class yields one ancestor per set of perfectly
/// linked focal sites, and the ancestral state for the surrounding sites is
/// inferred from the samples that carry the focal mutation.
pub struct AncestorBuilder<'a> {
    variant_data: &'a VariantData,
}

impl<'a> AncestorBuilder<'a> {
    /// Create a new ancestor builder for the given variant data.
    pub fn new(variant_data: &'a VariantData) -> Self {
        Self { variant_data }
    }

    /// Whether a site can serve as a focal site. Sites carried by fewer than
    /// two samples define no shared ancestor; their derived alleles surface
    /// as mutations on the carrying sample instead.
    fn is_focal_candidate(site: &VariantSite) -> bool {
        site.frequency() >= 2
    }

    /// Group the focal-site candidates into frequency classes and, within
    /// each class, into sets of perfectly linked sites (sites whose carrier
    /// sample sets are identical). Classes are returned oldest (highest
    /// frequency) first; within a class, groups are ordered by their leftmost
    /// focal site.
    fn frequency_classes(&self) -> Vec<(usize, Vec<Vec<VariantIndex>>)> {
        let mut class_sites: HashMap<usize, Vec<VariantIndex>, BuildHasherDefault<XxHash64>> =
            Default::default();
        for (index, site) in self.variant_data.iter_with_index() {
            if Self::is_focal_candidate(site) {
                class_sites.entry(site.frequency()).or_default().push(index);
            }
        }

        let mut classes: Vec<(usize, Vec<VariantIndex>)> = class_sites.into_iter().collect();
        classes.sort_unstable_by(|(a, _), (b, _)| b.cmp(a));

        classes
            .into_iter()
            .map(|(frequency, sites)| {
                let mut linked_groups: HashMap<
                    Vec<Allele>,
                    Vec<VariantIndex>,
                    BuildHasherDefault<XxHash64>,
                > = Default::default();
                for site in sites {
                    linked_groups
                        .entry(self.variant_data[site].genotypes().to_vec())
                        .or_default()
                        .push(site);
                }

                let mut groups: Vec<Vec<VariantIndex>> = linked_groups.into_values().collect();
                groups.sort_unstable_by_key(|group| group[0]);
                (frequency, groups)
            })
            .collect()
    }

    /// For a given set of focal sites, compute the ancestor that carries the
    /// derived allele at those sites. The focal sites must be sorted and of
    /// equal frequency.
    ///
    /// The ancestral state of the surrounding sites is inferred from the
    /// samples that carry the derived allele at every focal site: sites of
    /// strictly older frequency classes are decided by majority vote among
    /// the carriers still consistent with the ancestor (ties resolve to the
    /// ancestral state), all other sites carry the ancestral state. The
    /// outward extension continues while any consistent carrier remains and
    /// ends, inclusive of the breaking site, once every carrier has
    /// recombined away from the ancestor.
    ///
    /// # Parameters
    /// - `focal_sites`: sorted set of variant indices the ancestor is built
    ///   for
    /// - `age`: the age assigned to the resulting sequence
    pub fn make_ancestor(
        &self,
        focal_sites: &[VariantIndex],
        age: u32,
    ) -> Result<AncestralSequence> {
        if focal_sites.is_empty() {
            return Err(InferenceError::invalid_data("no focal sites given"));
        }
        debug_assert!(focal_sites.windows(2).all(|sites| sites[0] < sites[1]));

        let focal_frequency = self.variant_data[focal_sites[0]].frequency();
        if focal_sites
            .iter()
            .any(|&site| self.variant_data[site].frequency() != focal_frequency)
        {
            return Err(InferenceError::invalid_data(
                "focal sites must share one frequency class",
            ));
        }

        // the samples that carry the derived allele at every focal site; the
        // ancestor is the putative haplotype those samples inherited it from
        let carriers: Vec<usize> = (0..self.variant_data.get_num_samples())
            .filter(|&sample| {
                focal_sites
                    .iter()
                    .all(|&site| self.variant_data[site].genotypes()[sample] == DERIVED_STATE)
            })
            .collect();

        if carriers.is_empty() {
            return Err(InferenceError::invalid_data(
                "no sample carries the derived allele at all focal sites",
            ));
        }

        let num_sites = self.variant_data.len();
        let mut ancestral_sequence = AncestralSequence::from_unknown_state(num_sites, age);

        for &focal_site in focal_sites {
            ancestral_sequence[focal_site] = DERIVED_STATE;
        }

        // infer the ancestor between focal sites; the extension termination
        // does not apply within the focal span
        for window in focal_sites.windows(2) {
            let (focal_site_i, focal_site_j) = (window[0], window[1]);
            for x in focal_site_i.0 + 1..focal_site_j.0 {
                let site = &self.variant_data[VariantIndex(x)];
                ancestral_sequence[x] = if site.frequency() > focal_frequency {
                    Self::consensus_state(site, &carriers)
                } else {
                    ANCESTRAL_STATE
                };
            }
        }

        // extend the ancestor to the left of the first focal site
        let modified_left = self.extend_ancestor(
            &mut self
                .variant_data
                .iter_with_index()
                .rev()
                .skip(num_sites - focal_sites[0].0),
            focal_frequency,
            &carriers,
            &mut ancestral_sequence,
        );

        // extend the ancestor to the right of the last focal site
        let last_focal_site = *focal_sites.last().unwrap();
        let modified_right = self.extend_ancestor(
            &mut self
                .variant_data
                .iter_with_index()
                .skip(last_focal_site.0 + 1),
            focal_frequency,
            &carriers,
            &mut ancestral_sequence,
        );

        ancestral_sequence.focal_sites = focal_sites.to_vec();
        ancestral_sequence.start = VariantIndex(focal_sites[0].0 - modified_left);
        ancestral_sequence.end = VariantIndex(last_focal_site.0 + modified_right + 1);

        Ok(ancestral_sequence)
    }

    /// Majority allele at `site` among the given samples, ties resolving to
    /// the ancestral state.
    fn consensus_state(site: &VariantSite, samples: &[usize]) -> Allele {
        let ones = samples
            .iter()
            .filter(|&&sample| site.genotypes()[sample] == DERIVED_STATE)
            .count();
        if 2 * ones > samples.len() {
            DERIVED_STATE
        } else {
            ANCESTRAL_STATE
        }
    }

    /// Extend an ancestral sequence outward over the sites provided by the
    /// iterator. Sites of strictly older frequency classes are decided by
    /// majority vote among the carriers still consistent with the ancestor
    /// (ties resolve to the ancestral state); all other sites carry the
    /// ancestral state.
    ///
    /// Every carrier accumulates the (ancestor, carrier) allele pairings it
    /// occurs with; once all four pairings have been seen, the carrier has
    /// recombined away from the ancestor and drops out of the consistent
    /// set. The extension ends, inclusive of the breaking site, when no
    /// consistent carrier remains.
    ///
    /// # Returns
    /// Returns the number of sites modified beyond the focal site.
    fn extend_ancestor(
        &self,
        site_iter: &mut dyn Iterator<Item = (VariantIndex, &VariantSite)>,
        focal_frequency: usize,
        carriers: &[usize],
        ancestral_sequence: &mut AncestralSequence,
    ) -> usize {
        // one bit per (ancestor state, carrier state) pairing; every carrier
        // starts out agreeing with the derived focal site
        const FOCAL_PAIRING: u8 = 1 << 0b11;
        const ALL_PAIRINGS: u8 = 0b1111;

        let mut modified_sites = 0;
        let mut consistent: Vec<(usize, u8)> = carriers
            .iter()
            .map(|&sample| (sample, FOCAL_PAIRING))
            .collect();

        for (variant_index, site) in site_iter {
            modified_sites += 1;
            let consensus = if site.frequency() > focal_frequency {
                let ones = consistent
                    .iter()
                    .filter(|&&(sample, _)| site.genotypes()[sample] == DERIVED_STATE)
                    .count();
                if 2 * ones > consistent.len() {
                    DERIVED_STATE
                } else {
                    ANCESTRAL_STATE
                }
            } else {
                // the mutation at this site postdates the ancestor
                ANCESTRAL_STATE
            };
            ancestral_sequence[variant_index] = consensus;

            for (sample, pairings) in &mut consistent {
                let pairing = ((consensus as u8) << 1) | (site.genotypes()[*sample] as u8);
                *pairings |= 1 << pairing;
            }
            consistent.retain(|&(_, pairings)| pairings != ALL_PAIRINGS);
            if consistent.is_empty() {
                break;
            }
        }

        modified_sites
    }

    /// Generate all ancestral sequences for the variant data, ordered oldest
    /// first with the universal root ancestor in front. The ages form
    /// contiguous epochs: the root occupies the oldest epoch on its own, and
    /// every frequency class is one epoch.
    pub fn generate_ancestors(&self) -> Result<Vec<AncestralSequence>> {
        let classes = self.frequency_classes();
        let num_epochs = classes.len() + 1;

        let mut ancestors = Vec::with_capacity(classes.iter().map(|(_, g)| g.len()).sum::<usize>() + 1);
        ancestors.push(AncestralSequence::ancestral_root(
            self.variant_data.len(),
            num_epochs as u32,
        ));

        for (class_index, (frequency, groups)) in classes.iter().enumerate() {
            let age = (num_epochs - (class_index + 1)) as u32;
            debug!(
                frequency,
                age,
                num_ancestors = groups.len(),
                "generating frequency class"
            );

            for focal_sites in groups {
                ancestors.push(self.make_ancestor(focal_sites, age)?);
            }
        }

        Ok(ancestors)
    }
}
