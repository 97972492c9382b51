//! Node storage and handles.

use triple_arena::{ptr_struct, Arena};

use crate::node::Node;

ptr_struct!(NodePtr);

/// Generation-checked arena holding every node of a tree.
pub(crate) type Nodes<K, V> = Arena<NodePtr, Node<K, V>>;

/// A handle to an entry stored in an [`OrderedTree`](crate::OrderedTree).
///
/// Handles are returned by [`insert`](crate::OrderedTree::insert) and
/// [`find`](crate::OrderedTree::find) and stay valid until the entry they
/// refer to is removed. A handle to a removed entry is *stale*: every tree
/// operation taking it treats the entry as absent, even after the storage
/// has been reused for another entry.
///
/// A handle is only meaningful for the tree that issued it (or a clone of
/// that tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef(pub(crate) NodePtr);
