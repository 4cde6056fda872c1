//! End-to-end invariants on a larger panel: every mutation carries the
//! child's actual allele, edgesets stay within the genome, and no edgeset is
//! duplicated.

mod common;

use treeweave::ancestors::{Ancestor, AncestorBuilder};
use treeweave::store::AncestorStore;

const PANEL: [[i8; 8]; 7] = [
    [0, 1, 1, 1, 1, 1, 0, 0],
    [0, 1, 1, 1, 0, 0, 0, 0],
    [0, 0, 1, 1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1, 1, 1, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 1, 0, 1, 0],
    [0, 0, 0, 1, 0, 1, 0, 1],
];

#[test]
fn mutations_match_child_haplotypes() {
    let data = common::create_variant_data(8.0, &PANEL);
    let samples = data.into_samples();

    // rebuild the deterministic ancestors to check internal nodes as well
    let ancestors = AncestorBuilder::new(&data).generate_ancestors().unwrap();
    let store = AncestorStore::from_ancestors(
        data.variant_positions().to_vec(),
        data.get_sequence_length(),
        &ancestors,
        1024,
    )
    .unwrap();

    let ts = common::infer(data);
    let num_ancestors = store.num_ancestors();

    assert_eq!(ts.num_nodes(), num_ancestors + 8);
    assert!(ts.num_mutations() > 0);

    for index in 0..ts.num_mutations() {
        let site = ts.mutations.site[index];
        let node = ts.mutations.node[index];
        let derived_state = ts.mutations.derived_state[index];

        if node < num_ancestors {
            let view = store.get_ancestor(Ancestor::new(node));
            assert_eq!(view.alleles[site], derived_state);
        } else {
            assert_eq!(samples[node - num_ancestors][site], derived_state);
        }
    }
}

#[test]
fn edgesets_are_unique_and_within_the_genome() {
    let data = common::create_variant_data(8.0, &PANEL);
    let sequence_length = data.get_sequence_length().unwrap();
    let ts = common::infer(data);

    let edgesets = common::edgesets(&ts);
    assert!(!edgesets.is_empty());

    for (left, right, parent, children) in &edgesets {
        assert!(*left < *right);
        assert!(*left >= 0.0 && *right <= sequence_length);
        assert!(!children.is_empty());
        assert!(children.windows(2).all(|w| w[0] < w[1]));
        // ids are a topological order: parents precede their children
        assert!(children.iter().all(|&child| child > *parent));
    }

    let mut keys: Vec<(usize, u64, u64)> = edgesets
        .iter()
        .map(|(left, right, parent, _)| (*parent, left.to_bits(), right.to_bits()))
        .collect();
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), total, "duplicate (parent, left, right) edgeset");
}
