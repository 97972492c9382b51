use crate::{entry_order, OrderedTree};

use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u8),
    Remove(u8),
    RemoveEntry(u8, u8),
    Update(u8, u8, u8),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    // A small key domain makes duplicate keys and exact duplicates common.
    let key = 0u8..32;
    let value = 0u8..4;
    prop_oneof![
        4 => (key.clone(), value.clone()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => key.clone().prop_map(Op::Remove),
        1 => (key.clone(), value.clone()).prop_map(|(k, v)| Op::RemoveEntry(k, v)),
        1 => (key.clone(), key, value).prop_map(|(k, nk, nv)| Op::Update(k, nk, nv)),
    ]
}

/// Reference model: entries kept sorted in tree order.
fn model_insert(model: &mut Vec<(u8, u8)>, key: u8, value: u8) -> bool {
    match model.binary_search_by(|(k, v)| entry_order((k, v), (&key, &value))) {
        Ok(_) => false,
        Err(pos) => {
            model.insert(pos, (key, value));
            true
        }
    }
}

fn model_remove(model: &mut Vec<(u8, u8)>, key: u8, value: u8) -> bool {
    match model.binary_search_by(|(k, v)| entry_order((k, v), (&key, &value))) {
        Ok(pos) => {
            model.remove(pos);
            true
        }
        Err(_) => false,
    }
}

fn assert_matches_model(tree: &OrderedTree<u8, u8>, model: &[(u8, u8)]) {
    tree.check_consistency();
    let entries: Vec<(u8, u8)> = tree.entries().into_iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, model);
    assert_eq!(tree.len(), model.len());
    assert_eq!(tree.is_empty(), model.is_empty());
}

proptest! {
    /// Apply random operations to the tree and to a sorted vector, asserting
    /// both hold the same entries in the same order after every step.
    #[test]
    fn prop_matches_sorted_model(ops in prop::collection::vec(arbitrary_op(), 0..200)) {
        let mut tree = OrderedTree::new();
        let mut model = Vec::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let len = tree.len();
                    let node = tree.insert(key, value);
                    let inserted = model_insert(&mut model, key, value);
                    prop_assert_eq!(tree.len(), len + usize::from(inserted));
                    prop_assert_eq!(tree.get(node), Some((&key, &value)));
                }
                Op::Remove(key) => {
                    match tree.find(&key) {
                        Some(node) => {
                            let (k, v) = tree.remove(node).unwrap();
                            prop_assert_eq!(k, key);
                            prop_assert!(model_remove(&mut model, k, v));
                            prop_assert!(!tree.contains(node));
                        }
                        None => {
                            prop_assert!(model.iter().all(|(k, _)| *k != key));
                        }
                    }
                }
                Op::RemoveEntry(key, value) => {
                    let removed = tree.remove_entry(&key, &value).is_some();
                    prop_assert_eq!(removed, model_remove(&mut model, key, value));
                }
                Op::Update(key, new_key, new_value) => {
                    if let Some(node) = tree.find(&key) {
                        let (k, v) = tree.get(node).map(|(k, v)| (*k, *v)).unwrap();
                        let updated = tree.update(node, new_key, new_value);
                        model_remove(&mut model, k, v);
                        model_insert(&mut model, new_key, new_value);
                        prop_assert_eq!(tree.get(updated), Some((&new_key, &new_value)));
                    }
                }
            }
            assert_matches_model(&tree, &model);
        }
    }

    /// Every inserted key is reachable through find, and the tree height stays
    /// within the AVL bound.
    #[test]
    fn prop_find_after_insert(keys in prop::collection::vec(any::<u16>(), 1..500)) {
        let mut tree = OrderedTree::new();
        for key in &keys {
            tree.insert(*key, ());
        }
        tree.check_consistency();

        for key in &keys {
            let node = tree.find(key);
            prop_assert!(node.is_some());
            prop_assert_eq!(tree.key(node.unwrap()), Some(key));
        }

        let bound = 1.45 * ((tree.len() + 2) as f64).log2();
        prop_assert!((tree.height() as f64) <= bound);
    }
}
