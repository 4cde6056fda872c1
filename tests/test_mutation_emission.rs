//! A query differing from its best-matching ancestor at exactly one
//! non-focal site must produce exactly one mutation carrying the query's
//! allele at that site.

use treeweave::config::InferenceConfig;
use treeweave::matching::{AncestorMatcher, Traceback};
use treeweave::store::{AncestorStore, AncestorStoreBuilder};
use treeweave::ts::TreeSequenceBuilder;
use treeweave::variants::{SequencePosition, VariantIndex};

#[test]
fn single_disagreement_emits_one_mutation() {
    let mut builder = AncestorStoreBuilder::new(4);
    builder.add(&[0, 0, 0, 0]).unwrap();
    builder.add(&[1, 1, 0, 1]).unwrap();

    let store = AncestorStore::new(
        SequencePosition::from_vec(vec![1.0, 2.0, 3.0, 4.0]),
        SequencePosition::from_f64(5.0),
        vec![2, 1],
        vec![(VariantIndex::from_usize(0), VariantIndex::from_usize(4)); 2],
        vec![vec![]; 2],
        builder.dump(),
    )
    .unwrap();

    // with a negligible recombination rate the path stays on ancestor 1 and
    // pays the single mismatch
    let matcher = AncestorMatcher::new(&store, 1e-6);
    let config = InferenceConfig::default();
    let mut tree_builder = TreeSequenceBuilder::new(&store, 1, &config);

    let mut traceback = Traceback::new(store.num_sites());
    let end_site_parent = matcher
        .best_path(
            2,
            &[1, 1, 1, 1],
            VariantIndex::from_usize(0),
            VariantIndex::from_usize(4),
            &[],
            1e-3,
            &mut traceback,
        )
        .unwrap();
    assert_eq!(end_site_parent.unwrap(), 1);

    tree_builder
        .update(
            2,
            &[1, 1, 1, 1],
            VariantIndex::from_usize(0),
            VariantIndex::from_usize(4),
            end_site_parent,
            &traceback,
        )
        .unwrap();
    tree_builder.resolve(1, &[2]).unwrap();

    let (site, node, derived_state) = tree_builder.dump_mutations();
    assert_eq!(site, [2]);
    assert_eq!(node, [2]);
    assert_eq!(derived_state, [1]);

    // a single edgeset covers the full interval
    let (left, right, parent, children, _) = tree_builder.dump_edgesets();
    assert_eq!(parent, [1]);
    assert_eq!(children, [2]);
    assert_eq!(left, [0.0]);
    assert_eq!(right, [5.0]);
}
