//! Two sites carried by exactly the same samples are perfectly linked and
//! must collapse into one ancestor with both sites focal, rather than two
//! separate ancestors.

mod common;

use treeweave::ancestors::AncestorBuilder;
use treeweave::variants::VariantIndex;

#[test]
fn linked_sites_share_one_ancestor() {
    let data = common::create_variant_data(3.0, &[[0, 1, 1, 1], [0, 1, 1, 1]]);

    let builder = AncestorBuilder::new(&data);
    let ancestors = builder.generate_ancestors().unwrap();

    assert_eq!(ancestors.len(), 2);
    assert_eq!(
        ancestors[1].focal_sites(),
        [VariantIndex::from_usize(0), VariantIndex::from_usize(1)]
    );
    assert_eq!(ancestors[1].haplotype(), vec![1, 1]);
}

#[test]
fn linked_panel_pipeline() {
    let data = common::create_variant_data(3.0, &[[0, 1, 1, 1], [0, 1, 1, 1]]);
    let ts = common::infer(data);

    // root + one ancestor + four samples
    assert_eq!(ts.num_nodes(), 6);

    // the carriers attach to the single ancestor over the whole genome
    let edgesets = common::edgesets(&ts);
    assert!(edgesets
        .iter()
        .any(|(left, right, parent, children)| *parent == 1
            && children == &[3, 4, 5]
            && *left == 0.0
            && *right == 3.0));

    // one mutation per focal site, both on the ancestor
    assert_eq!(ts.mutations.site, [0, 1]);
    assert_eq!(ts.mutations.node, [1, 1]);
}
