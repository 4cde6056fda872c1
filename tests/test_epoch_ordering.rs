//! A panel with three distinct frequency classes: after the run, every
//! edgeset must connect a child to a parent from a strictly older epoch.

mod common;

#[test]
fn parents_are_strictly_older() {
    let data = common::create_variant_data(
        5.0,
        &[
            [0, 1, 1, 1, 1, 0],
            [0, 1, 1, 1, 0, 0],
            [0, 0, 1, 1, 0, 0],
            [0, 1, 1, 0, 0, 0],
        ],
    );
    let ts = common::infer(data);

    // root plus the three frequency classes
    let mut ages: Vec<f64> = ts
        .nodes
        .time
        .iter()
        .copied()
        .filter(|&time| time > 0.0)
        .collect();
    ages.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
    ages.dedup();
    assert_eq!(ages, [1.0, 2.0, 3.0, 4.0]);

    assert!(ts.num_edgesets() > 0);
    for (_, _, parent, children) in ts.edgeset_iter() {
        for &child in children {
            assert!(
                ts.nodes.time[parent] > ts.nodes.time[child],
                "edgeset parent {} (time {}) is not older than child {} (time {})",
                parent,
                ts.nodes.time[parent],
                child,
                ts.nodes.time[child]
            );
        }
    }
}

#[test]
fn intervals_of_one_parent_are_disjoint() {
    let data = common::create_variant_data(
        5.0,
        &[
            [0, 1, 1, 1, 1, 0],
            [0, 1, 1, 1, 0, 0],
            [0, 0, 1, 1, 0, 0],
            [0, 1, 1, 0, 0, 0],
        ],
    );
    let ts = common::infer(data);

    let mut edgesets = common::edgesets(&ts);
    edgesets.sort_by(|a, b| a.2.cmp(&b.2).then(a.0.partial_cmp(&b.0).unwrap()));

    for window in edgesets.windows(2) {
        let (left_a, right_a, parent_a, _) = &window[0];
        let (left_b, _, parent_b, _) = &window[1];
        if parent_a == parent_b {
            assert!(
                right_a <= left_b,
                "edgesets of parent {} overlap: [{}, {}) and [{}, ..)",
                parent_a,
                left_a,
                right_a,
                left_b
            );
        }
    }
}
