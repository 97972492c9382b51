//! An ordered multimap implemented with an AVL tree.
//!
//! [`OrderedTree`] stores (key, value) entries ordered by key, with entries of
//! equal key ordered by value descending (see [`entry_order`]). Lookups,
//! inserts and removals take logarithmic time.
//!
//! Entries are addressed through [`NodeRef`] handles. Handles are checked
//! against the node arena's generation counter, so a handle to a removed
//! entry is detected as stale rather than silently aliasing whatever entry
//! reuses its storage.
//!
//! ```
//! use ordered_avl::OrderedTree;
//!
//! let mut tree = OrderedTree::new();
//! tree.insert(3, "c");
//! tree.insert(1, "a");
//! let b = tree.insert(2, "b");
//! assert_eq!(tree.root().map(|root| *root.key()), Some(2));
//!
//! let removed = tree.remove(b);
//! assert_eq!(removed, Some((2, "b")));
//! assert!(tree.find(&2).is_none());
//! assert_eq!(tree.len(), 2);
//! ```

mod arena;
mod error;
mod node;
mod tree;

pub use arena::NodeRef;
pub use error::{Result, TreeError};
pub use node::{entry_order, NodeView};
pub use tree::OrderedTree;

#[cfg(test)]
mod proptests;
