//! The finalized store must reproduce every generated ancestor exactly, and
//! the run-length encoding at every site must partition the full ancestor id
//! range.

mod common;

use treeweave::ancestors::{Ancestor, AncestorBuilder};
use treeweave::store::AncestorStore;
use treeweave::variants::VariantIndex;

#[test]
fn store_reproduces_generated_ancestors() {
    let data = common::create_variant_data(
        6.0,
        &[
            [0, 1, 1, 0, 1, 0],
            [0, 1, 1, 1, 0, 0],
            [1, 0, 0, 1, 1, 0],
            [0, 1, 0, 1, 0, 1],
            [0, 0, 1, 1, 0, 0],
        ],
    );

    let builder = AncestorBuilder::new(&data);
    let ancestors = builder.generate_ancestors().unwrap();
    let store = AncestorStore::from_ancestors(
        data.variant_positions().to_vec(),
        data.get_sequence_length(),
        &ancestors,
        1024,
    )
    .unwrap();

    assert_eq!(store.num_ancestors(), ancestors.len());

    for (index, ancestor) in ancestors.iter().enumerate() {
        let id = Ancestor::new(index);
        let view = store.get_ancestor(id);

        assert_eq!(view.start, ancestor.start());
        assert_eq!(view.end, ancestor.end());
        assert_eq!(view.focal_sites, ancestor.focal_sites());

        // within the defined interval the view, the direct state lookup, and
        // the generated haplotype agree
        for site in ancestor.start().unwrap()..ancestor.end().unwrap() {
            let site_index = VariantIndex::from_usize(site);
            assert_eq!(view.alleles[site], ancestor.full_state()[site]);
            assert_eq!(store.get_state(site_index, id), ancestor.full_state()[site]);
        }
    }
}

#[test]
fn site_segments_partition_the_ancestor_range() {
    let data = common::create_variant_data(
        6.0,
        &[
            [0, 1, 1, 0, 1, 0],
            [0, 1, 1, 1, 0, 0],
            [1, 0, 0, 1, 1, 0],
            [0, 1, 0, 1, 0, 1],
            [0, 0, 1, 1, 0, 0],
        ],
    );

    let builder = AncestorBuilder::new(&data);
    let ancestors = builder.generate_ancestors().unwrap();
    let store = AncestorStore::from_ancestors(
        data.variant_positions().to_vec(),
        data.get_sequence_length(),
        &ancestors,
        1024,
    )
    .unwrap();

    for site in 0..store.num_sites() {
        let segments = store.site_segments(VariantIndex::from_usize(site));
        assert!(!segments.is_empty());
        assert_eq!(segments[0].start, 0);
        assert_eq!(segments.last().unwrap().end, store.num_ancestors());
        for window in segments.windows(2) {
            assert_eq!(window[0].end, window[1].start);
        }
    }
}

#[test]
fn epochs_are_contiguous_and_oldest_first() {
    let data = common::create_variant_data(
        6.0,
        &[
            [0, 1, 1, 0, 1, 0],
            [0, 1, 1, 1, 0, 0],
            [1, 0, 0, 1, 1, 0],
            [0, 1, 0, 1, 0, 1],
            [0, 0, 1, 1, 0, 0],
        ],
    );

    let builder = AncestorBuilder::new(&data);
    let ancestors = builder.generate_ancestors().unwrap();
    let store = AncestorStore::from_ancestors(
        data.variant_positions().to_vec(),
        data.get_sequence_length(),
        &ancestors,
        1024,
    )
    .unwrap();

    let mut expected_first = 0;
    let mut previous_age = None;
    for epoch in 0..store.num_epochs() {
        let epoch_ancestors = store.get_epoch_ancestors(epoch);
        assert!(!epoch_ancestors.is_empty());
        assert_eq!(epoch_ancestors[0].unwrap(), expected_first);

        let age = store.age(epoch_ancestors[0]);
        for &ancestor in &epoch_ancestors {
            assert_eq!(store.age(ancestor), age);
            assert_eq!(store.num_older_ancestors(ancestor), expected_first);
        }
        if let Some(previous) = previous_age {
            assert!(age < previous);
        }

        previous_age = Some(age);
        expected_first += epoch_ancestors.len();
    }
    assert_eq!(expected_first, store.num_ancestors());
}
