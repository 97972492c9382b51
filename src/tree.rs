use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;

use tracing::{debug, trace};

use crate::arena::{NodePtr, NodeRef, Nodes};
use crate::error::{Result, TreeError};
use crate::node::{entry_order, Link, Node, NodeView};

/// An ordered multimap implemented with an AVL tree.
///
/// Entries are kept in [`entry_order`]: by key ascending, and for equal keys by
/// value descending. The same key may be stored several times with different
/// values; inserting an identical (key, value) pair again is a no-op.
///
/// Stored entries are addressed by [`NodeRef`] handles. A handle becomes stale
/// once its entry is removed, and stale handles are treated as absent.
///
/// ```
/// use ordered_avl::OrderedTree;
/// let mut tree = OrderedTree::new();
/// let one = tree.insert(1, "one");
/// tree.insert(2, "two");
/// assert_eq!(tree.find(&1), Some(one));
/// let uno = tree.update(one, 1, "uno");
/// assert_eq!(tree.get(uno), Some((&1, &"uno")));
/// assert!(tree.get(one).is_none());
/// ```
#[derive(Clone)]
pub struct OrderedTree<K, V> {
    nodes: Nodes<K, V>,
    root: Link,
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K: Ord, V: Ord> OrderedTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        Self {
            nodes: Nodes::new(),
            root: None,
        }
    }

    /// Creates an empty tree with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Nodes::new();
        nodes.reserve(capacity);
        Self { nodes, root: None }
    }

    /// Returns true if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the height of the tree: 0 if empty, 1 for a single entry.
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Removes all entries. Every outstanding handle becomes stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns a view of the root node.
    pub fn root(&self) -> Option<NodeView<'_, K, V>> {
        self.root.map(|ptr| NodeView::new(&self.nodes, ptr))
    }

    /// Returns a view of the node behind a handle, or `None` if the handle is stale.
    pub fn node(&self, node: NodeRef) -> Option<NodeView<'_, K, V>> {
        self.nodes
            .contains(node.0)
            .then(|| NodeView::new(&self.nodes, node.0))
    }

    /// Returns the entry behind a handle, or `None` if the handle is stale.
    pub fn get(&self, node: NodeRef) -> Option<(&K, &V)> {
        let node = self.nodes.get(node.0)?;
        Some((&node.key, &node.value))
    }

    /// Returns the key of the entry behind a handle, or `None` if the handle is stale.
    pub fn key(&self, node: NodeRef) -> Option<&K> {
        self.get(node).map(|(key, _)| key)
    }

    /// Returns the value of the entry behind a handle, or `None` if the handle is stale.
    pub fn value(&self, node: NodeRef) -> Option<&V> {
        self.get(node).map(|(_, value)| value)
    }

    /// Returns true if the handle refers to an entry in this tree.
    pub fn contains(&self, node: NodeRef) -> bool {
        self.nodes.contains(node.0)
    }

    /// Returns a node whose key equals the given key.
    ///
    /// If several entries share the key, the first one met on the search path
    /// is returned, which is not necessarily the first in tree order.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(ptr) = current {
            let node = &self.nodes[ptr];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(NodeRef(ptr)),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Returns the node holding exactly the given key and value.
    pub fn find_entry(&self, key: &K, value: &V) -> Option<NodeRef> {
        let mut current = self.root;
        while let Some(ptr) = current {
            let node = &self.nodes[ptr];
            current = match entry_order((key, value), (&node.key, &node.value)) {
                Ordering::Equal => return Some(NodeRef(ptr)),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Inserts an entry and returns its handle.
    ///
    /// If an entry with an equal key *and* an equal value is already stored, the
    /// tree is left unchanged and the existing entry's handle is returned.
    pub fn insert(&mut self, key: K, value: V) -> NodeRef {
        let (parent, order) = match self.find_insert_pos(&key, &value) {
            Ok(pos) => pos,
            Err(existing) => return NodeRef(existing),
        };

        let ptr = self.nodes.insert(Node::new(parent, key, value));
        match (parent, order) {
            (None, _) => self.root = Some(ptr),
            (Some(parent_ptr), Ordering::Less) => self.nodes[parent_ptr].left = Some(ptr),
            (Some(parent_ptr), _) => self.nodes[parent_ptr].right = Some(ptr),
        }
        self.rebalance(parent);
        NodeRef(ptr)
    }

    /// Removes the entry behind a handle and returns it.
    /// Returns `None` and leaves the tree unchanged if the handle is stale.
    pub fn remove(&mut self, node: NodeRef) -> Option<(K, V)> {
        let ptr = node.0;
        if !self.nodes.contains(ptr) {
            debug!(?node, "remove with stale node reference");
            return None;
        }
        debug_assert!(self.len() >= 1);
        self.unlink_node(ptr);
        let removed = self.nodes.remove(ptr)?;
        Some((removed.key, removed.value))
    }

    /// Removes the entry with exactly the given key and value, if present.
    pub fn remove_entry(&mut self, key: &K, value: &V) -> Option<(K, V)> {
        let node = self.find_entry(key, value)?;
        self.remove(node)
    }

    /// Replaces an entry by removing it and inserting the new key and value.
    ///
    /// The old handle is stale afterwards; use the returned one. If `node` is
    /// already stale, nothing is removed and the new entry is still inserted.
    pub fn update(&mut self, node: NodeRef, key: K, value: V) -> NodeRef {
        self.remove(node);
        self.insert(key, value)
    }

    /// Like [`update`](Self::update), but fails without inserting anything if
    /// `node` is stale.
    pub fn try_update(&mut self, node: NodeRef, key: K, value: V) -> Result<NodeRef> {
        if !self.contains(node) {
            return Err(TreeError::StaleNodeRef(node));
        }
        Ok(self.update(node, key, value))
    }

    /// Checks links, ordering, cached heights, balance and node count.
    /// Panics on the first violation.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check root link
        if let Some(root_ptr) = self.root {
            assert!(self.nodes[root_ptr].parent.is_none());
        }

        // Check links, heights and balance, recomputing every height from scratch
        let mut num_nodes = 0;
        self.check_subtree(self.root, None, &mut num_nodes);
        assert_eq!(num_nodes, self.len());

        // Check tree order
        let mut prev: Link = None;
        self.traverse(|ptr| {
            if let Some(prev_ptr) = prev {
                let (a, b) = (&self.nodes[prev_ptr], &self.nodes[ptr]);
                assert_eq!(
                    entry_order((&a.key, &a.value), (&b.key, &b.value)),
                    Ordering::Less
                );
            }
            prev = Some(ptr);
        });
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn check_subtree(&self, link: Link, parent: Link, num_nodes: &mut usize) -> usize {
        let Some(ptr) = link else {
            return 0;
        };
        let node = &self.nodes[ptr];
        assert_eq!(node.parent, parent);
        let left_height = self.check_subtree(node.left, link, num_nodes);
        let right_height = self.check_subtree(node.right, link, num_nodes);

        // Check height
        let height = 1 + cmp::max(left_height, right_height);
        assert_eq!(node.height, height);

        // Check AVL condition (nearly balance)
        assert!(left_height <= right_height + 1);
        assert!(right_height <= left_height + 1);

        *num_nodes += 1;
        height
    }

    /// Entries in tree order, for tests.
    #[cfg(test)]
    pub(crate) fn entries(&self) -> Vec<(&K, &V)> {
        let mut entries = Vec::with_capacity(self.len());
        self.traverse(|ptr| entries.push((&self.nodes[ptr].key, &self.nodes[ptr].value)));
        entries
    }

    /// Finds the parent link and side for a new entry.
    /// Returns the existing node if an equal entry is stored.
    fn find_insert_pos(
        &self,
        key: &K,
        value: &V,
    ) -> std::result::Result<(Link, Ordering), NodePtr> {
        let mut parent: Link = None;
        let mut order = Ordering::Equal;
        let mut current = self.root;
        while let Some(ptr) = current {
            let node = &self.nodes[ptr];
            order = entry_order((key, value), (&node.key, &node.value));
            current = match order {
                Ordering::Equal => return Err(ptr),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            parent = Some(ptr);
        }
        Ok((parent, order))
    }

    fn unlink_node(&mut self, ptr: NodePtr) {
        let Node {
            left,
            right,
            parent,
            height,
            ..
        } = self.nodes[ptr];

        match (left, right) {
            (Some(left_ptr), Some(right_ptr)) => {
                // Find in-order successor: smallest node in right sub tree
                let mut successor = right_ptr;
                while let Some(next) = self.nodes[successor].left {
                    successor = next;
                }

                // Successor has no left child, splice its right sub tree into its place
                let mut rebalance_from = successor;
                if successor != right_ptr {
                    let successor_parent = self.nodes[successor].parent;
                    let successor_right = self.nodes[successor].right;
                    if let Some(successor_parent_ptr) = successor_parent {
                        self.nodes[successor_parent_ptr].left = successor_right;
                        rebalance_from = successor_parent_ptr;
                    }
                    if let Some(successor_right_ptr) = successor_right {
                        self.nodes[successor_right_ptr].parent = successor_parent;
                    }
                    self.nodes[successor].right = Some(right_ptr);
                    self.nodes[right_ptr].parent = Some(successor);
                }

                // Move successor into the position of the node to-unlink
                trace!(node = ?ptr, ?successor, "relocate successor");
                self.nodes[successor].left = Some(left_ptr);
                self.nodes[left_ptr].parent = Some(successor);
                self.nodes[successor].height = height;
                self.replace_in_parent(ptr, Some(successor));

                // Former parent of successor might be out of balance now
                self.rebalance(Some(rebalance_from));
            }
            _ => {
                // Node to-unlink is stem or leaf, replace by its only child
                self.replace_in_parent(ptr, left.or(right));
                self.rebalance(parent);
            }
        }
    }

    /// Links `replacement` into the slot that currently holds `ptr`.
    fn replace_in_parent(&mut self, ptr: NodePtr, replacement: Link) {
        let parent = self.nodes[ptr].parent;
        if let Some(replacement_ptr) = replacement {
            self.nodes[replacement_ptr].parent = parent;
        }
        match parent {
            None => self.root = replacement,
            Some(parent_ptr) => {
                if self.nodes[parent_ptr].left == Some(ptr) {
                    self.nodes[parent_ptr].left = replacement;
                } else {
                    self.nodes[parent_ptr].right = replacement;
                }
            }
        }
    }

    fn height_of(&self, link: Link) -> usize {
        match link {
            None => 0,
            Some(ptr) => self.nodes[ptr].height,
        }
    }

    fn balance_factor(&self, link: Link) -> isize {
        match link {
            None => 0,
            Some(ptr) => {
                let node = &self.nodes[ptr];
                self.height_of(node.right) as isize - self.height_of(node.left) as isize
            }
        }
    }

    fn adjust_height(&mut self, ptr: NodePtr) {
        let node = &self.nodes[ptr];
        let height = 1 + cmp::max(self.height_of(node.left), self.height_of(node.right));
        self.nodes[ptr].height = height;
    }

    /// Promotes the right child of the given node. Returns the new subtree root.
    fn rotate_left(&mut self, ptr: NodePtr) -> NodePtr {
        let Some(right_ptr) = self.nodes[ptr].right else {
            return ptr;
        };
        trace!(node = ?ptr, "rotate left");

        let right_left = self.nodes[right_ptr].left;
        self.nodes[ptr].right = right_left;
        if let Some(right_left_ptr) = right_left {
            self.nodes[right_left_ptr].parent = Some(ptr);
        }

        self.replace_in_parent(ptr, Some(right_ptr));
        self.nodes[right_ptr].left = Some(ptr);
        self.nodes[ptr].parent = Some(right_ptr);

        self.adjust_height(ptr);
        self.adjust_height(right_ptr);
        right_ptr
    }

    /// Promotes the left child of the given node. Returns the new subtree root.
    fn rotate_right(&mut self, ptr: NodePtr) -> NodePtr {
        let Some(left_ptr) = self.nodes[ptr].left else {
            return ptr;
        };
        trace!(node = ?ptr, "rotate right");

        let left_right = self.nodes[left_ptr].right;
        self.nodes[ptr].left = left_right;
        if let Some(left_right_ptr) = left_right {
            self.nodes[left_right_ptr].parent = Some(ptr);
        }

        self.replace_in_parent(ptr, Some(left_ptr));
        self.nodes[left_ptr].right = Some(ptr);
        self.nodes[ptr].parent = Some(left_ptr);

        self.adjust_height(ptr);
        self.adjust_height(left_ptr);
        left_ptr
    }

    fn rotate_right_left(&mut self, ptr: NodePtr) -> NodePtr {
        if let Some(right_ptr) = self.nodes[ptr].right {
            self.rotate_right(right_ptr);
        }
        self.rotate_left(ptr)
    }

    fn rotate_left_right(&mut self, ptr: NodePtr) -> NodePtr {
        if let Some(left_ptr) = self.nodes[ptr].left {
            self.rotate_left(left_ptr);
        }
        self.rotate_right(ptr)
    }

    /// Rebalances nodes starting from given position up to the root node.
    fn rebalance(&mut self, start_from: Link) {
        let mut current = start_from;
        while let Some(ptr) = current {
            let subtree_root = self.rebalance_node(ptr);
            current = self.nodes[subtree_root].parent;
        }
    }

    /// Adjusts the height of the given node and restores the AVL condition there.
    /// Returns the root of the subtree that took the node's place.
    fn rebalance_node(&mut self, ptr: NodePtr) -> NodePtr {
        self.adjust_height(ptr);
        let balanced = self.balance_factor(Some(ptr));
        debug_assert!((-2..=2).contains(&balanced));
        if balanced >= 2 {
            if self.balance_factor(self.nodes[ptr].right) < 0 {
                self.rotate_right_left(ptr)
            } else {
                self.rotate_left(ptr)
            }
        } else if balanced <= -2 {
            if self.balance_factor(self.nodes[ptr].left) == 1 {
                self.rotate_left_right(ptr)
            } else {
                self.rotate_right(ptr)
            }
        } else {
            ptr
        }
    }

    /// Visits nodes in tree order.
    fn traverse<F: FnMut(NodePtr)>(&self, mut inorder: F) {
        if let Some(mut ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        if let Some(left_ptr) = self.nodes[ptr].left {
                            ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(ptr);
                        if let Some(right_ptr) = self.nodes[ptr].right {
                            ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => match self.nodes[ptr].parent {
                        Some(parent_ptr) => {
                            if self.nodes[parent_ptr].left == Some(ptr) {
                                dir = Direction::FromLeft;
                            }
                            ptr = parent_ptr;
                        }
                        None => break,
                    },
                }
            }
        }
    }
}

impl<K: Ord, V: Ord> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V: Ord + fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = f.debug_map();
        self.traverse(|ptr| {
            entries.entry(&self.nodes[ptr].key, &self.nodes[ptr].value);
        });
        entries.finish()
    }
}
