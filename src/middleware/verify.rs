//! Independent check that a sequence of nodes respects its dependencies.

use std::collections::HashSet;

use super::node::Node;

/// Returns `true` if every node in `nodes` appears after all of its declared
/// dependencies.
///
/// A dependency that never appears earlier in the sequence fails the check,
/// whether it comes later or is absent altogether. This never errors; it is
/// an oracle for orders produced elsewhere, such as
/// [`Resolver::ordered_middleware`](super::Resolver::ordered_middleware).
///
/// ```rust
/// use ordo::middleware::{Node, verify_correct_ordering};
///
/// let noop = |next: ()| next;
/// let id = Node::new("request-id", noop, [] as [&str; 0]);
/// let auth = Node::new("auth", noop, ["request-id"]);
///
/// assert!(verify_correct_ordering([&id, &auth]));
/// assert!(!verify_correct_ordering([&auth, &id]));
/// ```
pub fn verify_correct_ordering<'a, H: 'a>(nodes: impl IntoIterator<Item = &'a Node<H>>) -> bool {
    let mut resolved = HashSet::new();
    for node in nodes {
        if !node.dependencies().iter().all(|dep| resolved.contains(dep)) {
            return false;
        }
        resolved.insert(node.name());
    }
    true
}
