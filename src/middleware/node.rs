//! Named middleware units and their identifiers.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

// ── Name ──────────────────────────────────────────────────────────────────────

/// Identifier of a middleware node.
///
/// Cheap to clone (`Arc<str>` underneath) and comparable. Names must be unique
/// among all nodes handed to one [`Resolver`](super::Resolver).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(Arc<str>);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&Name> for Name {
    fn from(n: &Name) -> Self {
        n.clone()
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// A handler transform: takes the next handler, returns the wrapped one.
pub type Action<H> = Arc<dyn Fn(H) -> H + Send + Sync + 'static>;

/// A named unit with declared dependencies and a wrapping action.
///
/// Dependencies mean "must run before me": at request time every dependency's
/// action executes before this node's. Nothing is validated here; unknown
/// dependency names only surface when a [`Resolver`](super::Resolver) is built.
pub struct Node<H> {
    name: Name,
    dependencies: Vec<Name>,
    action: Action<H>,
}

impl<H> Node<H> {
    /// Builds a node from a name, a wrapping action and its dependency names.
    ///
    /// ```rust
    /// use ordo::middleware::Node;
    ///
    /// let auth: Node<u32> = Node::new("auth", |next: u32| next + 1, ["request-id"]);
    /// assert_eq!(auth.name(), "auth");
    /// assert_eq!(auth.dependencies().len(), 1);
    /// ```
    pub fn new<F, I, N>(name: impl Into<Name>, action: F, dependencies: I) -> Self
    where
        F: Fn(H) -> H + Send + Sync + 'static,
        I: IntoIterator<Item = N>,
        N: Into<Name>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            action: Arc::new(action),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Declared dependency names, in declaration order. May be empty and may
    /// contain duplicates.
    pub fn dependencies(&self) -> &[Name] {
        &self.dependencies
    }

    pub fn action(&self) -> &Action<H> {
        &self.action
    }

    pub(crate) fn apply(&self, next: H) -> H {
        (self.action)(next)
    }
}

impl<H> Clone for Node<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            dependencies: self.dependencies.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<H> fmt::Debug for Node<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("action", &"<action>")
            .finish()
    }
}
