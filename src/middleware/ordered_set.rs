//! Insertion-ordered name set used to record the resolution order.

use indexmap::IndexSet;

use super::node::{Name, Node};

/// A set of names that remembers the order in which they were first added.
///
/// Backed by [`IndexSet`], so membership tests are O(1) and enumeration
/// follows first insertion.
#[derive(Clone, Debug, Default)]
pub(crate) struct OrderedSet {
    names: IndexSet<Name>,
}

impl OrderedSet {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { names: IndexSet::with_capacity(n) }
    }

    /// Adds the node's name. Adding a name that is already present is a no-op
    /// and does not move it.
    pub(crate) fn add<H>(&mut self, node: &Node<H>) {
        if !self.names.contains(node.name()) {
            self.names.insert(node.name().clone());
        }
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in first-insertion order.
    pub(crate) fn keys(&self) -> impl ExactSizeIterator<Item = &Name> + '_ {
        self.names.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> Node<()> {
        Node::new(name, |next: ()| next, Vec::<Name>::new())
    }

    #[test]
    fn enumerates_in_first_insertion_order() {
        let mut set = OrderedSet::default();
        for n in ["e", "d", "c", "d", "e", "a"] {
            set.add(&node(n));
        }
        let keys: Vec<&str> = set.keys().map(Name::as_str).collect();
        assert_eq!(keys, ["e", "d", "c", "a"]);
        assert_eq!(set.keys().len(), 4);
    }

    #[test]
    fn membership() {
        let mut set = OrderedSet::with_capacity(2);
        assert!(!set.has("a"));
        set.add(&node("a"));
        assert!(set.has("a"));
        assert!(!set.has("b"));
    }
}
