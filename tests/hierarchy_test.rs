//! Descendant closure over in-memory hierarchy edges.
//!
//! Run with: cargo test --test hierarchy_test

use flowboard::services::hierarchy::{Closure, HierarchyError, descendants_in};
use std::collections::HashSet;
use uuid::Uuid;

fn ids<const N: usize>() -> [Uuid; N] {
    std::array::from_fn(|_| Uuid::new_v4())
}

#[test]
fn closure_of_root_includes_every_generation() {
    let [root, a, b, c] = ids();
    let nodes = [(root, None), (a, Some(root)), (b, Some(root)), (c, Some(a))];

    let members = descendants_in(root, &nodes).unwrap();
    assert_eq!(members, HashSet::from([root, a, b, c]));
}

#[test]
fn closure_of_leaf_is_itself() {
    let [root, a, b, c] = ids();
    let nodes = [(root, None), (a, Some(root)), (b, Some(root)), (c, Some(a))];

    assert_eq!(descendants_in(b, &nodes).unwrap(), HashSet::from([b]));
    assert_eq!(descendants_in(a, &nodes).unwrap(), HashSet::from([a, c]));
}

#[test]
fn unknown_root_resolves_to_itself() {
    let [root, a, stranger] = ids();
    let nodes = [(root, None), (a, Some(root))];

    assert_eq!(
        descendants_in(stranger, &nodes).unwrap(),
        HashSet::from([stranger])
    );
}

#[test]
fn sibling_trees_stay_separate() {
    let [north, south, n1, s1] = ids();
    let nodes = [
        (north, None),
        (south, None),
        (n1, Some(north)),
        (s1, Some(south)),
    ];

    let members = descendants_in(north, &nodes).unwrap();
    assert!(members.contains(&n1));
    assert!(!members.contains(&south));
    assert!(!members.contains(&s1));
}

#[test]
fn deep_chain_terminates() {
    let chain: Vec<Uuid> = (0..500).map(|_| Uuid::new_v4()).collect();
    let nodes: Vec<(Uuid, Option<Uuid>)> = chain
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i.checked_sub(1).map(|p| chain[p])))
        .collect();

    let members = descendants_in(chain[0], &nodes).unwrap();
    assert_eq!(members.len(), chain.len());
}

#[test]
fn cycle_through_root_is_an_integrity_error() {
    let [root, a, b] = ids();
    // root -> a -> b -> root
    let nodes = [(root, Some(b)), (a, Some(root)), (b, Some(a))];

    let err = descendants_in(root, &nodes).unwrap_err();
    assert_eq!(err, HierarchyError::Cycle { node: root });
}

#[test]
fn self_loop_is_an_integrity_error() {
    let [root] = ids();
    let nodes = [(root, Some(root))];

    assert!(matches!(
        descendants_in(root, &nodes),
        Err(HierarchyError::Cycle { .. })
    ));
}

#[test]
fn absorb_ignores_edges_off_the_frontier() {
    let [root, a, elsewhere, b] = ids();
    let mut closure = Closure::new(root);

    closure.absorb([(a, root), (b, elsewhere)]).unwrap();
    assert_eq!(closure.frontier(), &[a]);

    closure.absorb([]).unwrap();
    assert!(closure.is_complete());
    assert_eq!(closure.into_members(), HashSet::from([root, a]));
}
