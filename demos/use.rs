use ordered_avl::OrderedTree;

fn main() {
    let mut tree = OrderedTree::new();
    tree.insert(0, "zero");
    let one = tree.insert(1, "one");
    tree.insert(2, "two");
    tree.insert(2, "two");
    tree.insert(2, "deux");
    tree.insert(3, "three");
    tree.insert(4, "four");
    assert_eq!(tree.len(), 6);
    assert_eq!(tree.value(one), Some(&"one"));

    let uno = tree.update(one, 1, "uno");
    assert!(tree.get(one).is_none());
    assert_eq!(tree.value(uno), Some(&"uno"));

    if let Some(node) = tree.find(&3) {
        tree.remove(node);
    }
    assert!(tree.find(&3).is_none());

    println!("{tree:?}");
    if let Some(root) = tree.root() {
        println!("root: {} => {} (height {})", root.key(), root.value(), root.height());
    }
}
