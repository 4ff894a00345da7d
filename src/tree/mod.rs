//! # Tree Module
//!
//! Compressed trie (radix tree) over path bytes, one tree per HTTP method.
//!
//! Each node stores only its own path fragment, not the full root-to-node
//! prefix, so splitting an edge during insertion is proportional to the
//! fragment length. Sibling nodes disambiguate by their first byte, which is
//! kept in the parent's `indices` list in the same order as `children`.
//!
//! Three kinds of edges exist:
//! - **static** fragments, matched byte for byte,
//! - **`{name}`** parameters, matching one segment up to the next `/`,
//! - **`{name...}`** catch-alls, matching the remainder of the path
//!   including the leading `/`; always the final segment of a route.
//!
//! Children are kept sorted by descending priority (the number of handlers
//! reachable through the child), so frequently registered subtrees are
//! checked first during lookup.
//!
//! Routes are inserted with [`Node::add_route`], resolved with
//! [`Node::get_value`] and repaired with
//! [`Node::find_case_insensitive_path`]. Insertion restructures the tree and
//! must not run concurrently with lookups; after setup the tree is read-only
//! and safe to share.

mod node;
mod lookup;
mod repair;

pub use node::Node;
pub(crate) use node::count_params;
