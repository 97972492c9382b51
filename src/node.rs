use std::cmp::Ordering;
use std::fmt;

use crate::arena::{NodePtr, NodeRef, Nodes};

pub(crate) type Link = Option<NodePtr>;

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(parent: Link, key: K, value: V) -> Self {
        Node {
            key,
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }
}

/// Compares two entries in tree order.
///
/// Entries are ordered by key ascending. Entries with equal keys are ordered
/// by value *descending*, so `(1, 9)` precedes `(1, 3)`, which precedes `(2, 0)`.
/// Two entries are equal only if both key and value are equal.
///
/// ```
/// use std::cmp::Ordering;
/// use ordered_avl::entry_order;
///
/// assert_eq!(entry_order((&1, &9), (&1, &3)), Ordering::Less);
/// assert_eq!(entry_order((&1, &3), (&2, &0)), Ordering::Less);
/// assert_eq!(entry_order((&1, &3), (&1, &3)), Ordering::Equal);
/// ```
pub fn entry_order<K: Ord, V: Ord>(lhs: (&K, &V), rhs: (&K, &V)) -> Ordering {
    lhs.0.cmp(rhs.0).then_with(|| rhs.1.cmp(lhs.1))
}

/// A read-only view of a node stored in an [`OrderedTree`](crate::OrderedTree).
///
/// Obtained from [`OrderedTree::node`](crate::OrderedTree::node) or
/// [`OrderedTree::root`](crate::OrderedTree::root); the tree cannot be modified
/// while a view is alive.
pub struct NodeView<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    ptr: NodePtr,
}

impl<'a, K, V> NodeView<'a, K, V> {
    pub(crate) fn new(nodes: &'a Nodes<K, V>, ptr: NodePtr) -> Self {
        Self { nodes, ptr }
    }

    fn link(&self, link: Link) -> Option<NodeView<'a, K, V>> {
        link.map(|ptr| NodeView::new(self.nodes, ptr))
    }

    /// Returns the handle of this node.
    pub fn handle(&self) -> NodeRef {
        NodeRef(self.ptr)
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> &'a K {
        &self.nodes[self.ptr].key
    }

    /// Returns the value stored in this node.
    pub fn value(&self) -> &'a V {
        &self.nodes[self.ptr].value
    }

    /// Returns the height of the subtree rooted at this node. A leaf has height 1.
    pub fn height(&self) -> usize {
        self.nodes[self.ptr].height
    }

    /// Returns the root of the left subtree, if any.
    pub fn left(&self) -> Option<NodeView<'a, K, V>> {
        self.link(self.nodes[self.ptr].left)
    }

    /// Returns the root of the right subtree, if any.
    pub fn right(&self) -> Option<NodeView<'a, K, V>> {
        self.link(self.nodes[self.ptr].right)
    }

    /// Returns the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<NodeView<'a, K, V>> {
        self.link(self.nodes[self.ptr].parent)
    }
}

impl<K, V> Clone for NodeView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeView<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeView<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}
