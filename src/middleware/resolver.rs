//! Dependency resolution and chain composition.
//!
//! # How an order is computed
//!
//! Resolution runs in two explicit phases:
//!
//! 1. **Walk.** A depth-first topological sort starting at the *primary*
//!    node. Every name is in one of three states: unvisited, in progress
//!    (on the current path), or resolved. A dependency edge that points at
//!    an in-progress node closes a cycle; a dependency with no registered
//!    node is missing. Nodes are emitted in post-order, so every dependency
//!    lands before its dependents.
//! 2. **Tail.** Supplied nodes the walk never reached are appended in the
//!    order they were supplied. They are *not* checked for cycles or missing
//!    dependencies.
//!
//! The walk uses an explicit stack rather than recursion, so deep graphs do
//! not grow the call stack.
//!
//! ```text
//! a → [b, d]    b → [c, e]    c → [d, e]    d → [e]    e → []
//!
//! resolved order:  e, d, c, b, a
//! composition:     a(b(c(d(e(terminal)))))
//! request flow:    e → d → c → b → a → terminal   (outermost layer runs first)
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::iter;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::node::{Name, Node};
use super::ordered_set::OrderedSet;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a [`Resolver`] could not be built.
///
/// All variants are fatal to construction. Fix the node set and build again.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ResolveError {
    /// The edge `from -> to` points back into the path currently being walked.
    #[error("unable to resolve, circular dependency: \"{from}\" -> \"{to}\"")]
    CircularDependency { from: Name, to: Name },
    /// `required_by` declares a dependency on `name`, which was never supplied.
    #[error("missing dependency \"{name}\" required by \"{required_by}\"")]
    MissingDependency { name: Name, required_by: Name },
    /// Two supplied nodes share a name.
    #[error("duplicate middleware name \"{name}\"")]
    DuplicateName { name: Name },
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// A dependency-ordered set of middleware nodes.
///
/// The order is computed once in [`Resolver::new`]; afterwards the resolver is
/// read-only and may be shared freely. [`Resolver::setup`] turns it into a
/// single handler transform.
pub struct Resolver<H> {
    lookup: HashMap<Name, Node<H>>,
    order: Arc<[Node<H>]>,
}

impl<H> Resolver<H> {
    /// Orders `primary` and `auxiliary` so every node follows its dependencies.
    ///
    /// Only the dependency closure of `primary` is walked and validated. Any
    /// other node is appended afterwards, in the order supplied.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::DuplicateName`] if two nodes share a name.
    /// - [`ResolveError::CircularDependency`] if the walk meets a cycle.
    /// - [`ResolveError::MissingDependency`] if a walked node depends on an
    ///   unknown name.
    ///
    /// ```rust
    /// use ordo::middleware::{Node, Resolver};
    ///
    /// let noop = |next: ()| next;
    /// let resolver = Resolver::new(
    ///     Node::new("auth", noop, ["request-id"]),
    ///     [Node::new("request-id", noop, [] as [&str; 0])],
    /// )?;
    ///
    /// let names: Vec<&str> = resolver.names().map(|n| n.as_str()).collect();
    /// assert_eq!(names, ["request-id", "auth"]);
    /// # Ok::<(), ordo::middleware::ResolveError>(())
    /// ```
    pub fn new(
        primary: Node<H>,
        auxiliary: impl IntoIterator<Item = Node<H>>,
    ) -> Result<Self, ResolveError> {
        let supplied: Vec<Node<H>> = iter::once(primary).chain(auxiliary).collect();

        let mut lookup = HashMap::with_capacity(supplied.len());
        for node in &supplied {
            if lookup.insert(node.name().clone(), node.clone()).is_some() {
                warn!(name = %node.name(), "duplicate middleware name");
                return Err(ResolveError::DuplicateName { name: node.name().clone() });
            }
        }

        let mut walk = Walk::new(&lookup);
        if let Err(e) = walk.run(&supplied[0]) {
            warn!(error = %e, "middleware resolution failed");
            return Err(e);
        }
        let resolved = walk.resolved;

        let mut order: Vec<Node<H>> = resolved.keys().map(|name| lookup[name].clone()).collect();
        let walked = order.len();
        order.extend(supplied.into_iter().filter(|node| !resolved.has(node.name().as_str())));

        if order.len() > walked {
            debug!(
                unreached = ?order[walked..].iter().map(Node::name).collect::<Vec<_>>(),
                "appending middleware not reachable from the primary node",
            );
        }
        debug!(order = ?order.iter().map(Node::name).collect::<Vec<_>>(), "middleware resolved");

        Ok(Self { lookup, order: order.into() })
    }

    /// The resolved order: dependencies first, unreached nodes last.
    pub fn ordered_middleware(&self) -> &[Node<H>] {
        &self.order
    }

    /// Names in resolved order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &Name> + '_ {
        self.order.iter().map(Node::name)
    }

    pub fn get(&self, name: &str) -> Option<&Node<H>> {
        self.lookup.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false`: a resolver holds at least its primary node.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<H: 'static> Resolver<H> {
    /// Composes every node's action into one handler transform.
    ///
    /// Actions are applied last-to-first, so the first resolved node ends up
    /// outermost and runs first when the returned handler is invoked. The
    /// transform keeps its own handle to the order and may be called any
    /// number of times.
    pub fn setup(&self) -> impl Fn(H) -> H + Send + Sync + use<H> {
        let order = Arc::clone(&self.order);
        move |terminal| order.iter().rev().fold(terminal, |next, node| node.apply(next))
    }
}

impl<H> Clone for Resolver<H> {
    fn clone(&self) -> Self {
        Self { lookup: self.lookup.clone(), order: Arc::clone(&self.order) }
    }
}

impl<H> fmt::Debug for Resolver<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("order", &self.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ── Depth-first walk ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Visit {
    Unvisited,
    InProgress,
    Resolved,
}

struct Walk<'a, H> {
    lookup: &'a HashMap<Name, Node<H>>,
    resolved: OrderedSet,
    in_progress: HashSet<Name>,
}

impl<'a, H> Walk<'a, H> {
    fn new(lookup: &'a HashMap<Name, Node<H>>) -> Self {
        Self {
            lookup,
            resolved: OrderedSet::with_capacity(lookup.len()),
            in_progress: HashSet::new(),
        }
    }

    fn visit(&self, name: &Name) -> Visit {
        if self.resolved.has(name.as_str()) {
            Visit::Resolved
        } else if self.in_progress.contains(name) {
            Visit::InProgress
        } else {
            Visit::Unvisited
        }
    }

    fn enter(&mut self, node: &'a Node<H>, stack: &mut Vec<(&'a Node<H>, usize)>) {
        self.in_progress.insert(node.name().clone());
        stack.push((node, 0));
    }

    fn run(&mut self, root: &'a Node<H>) -> Result<(), ResolveError> {
        // Each frame is a node and the index of its next unprocessed dependency.
        let mut stack = Vec::new();
        self.enter(root, &mut stack);

        while let Some((node, next_dep)) = stack.last_mut() {
            let node: &'a Node<H> = *node;
            let Some(dep) = node.dependencies().get(*next_dep) else {
                self.in_progress.remove(node.name());
                self.resolved.add(node);
                stack.pop();
                continue;
            };
            *next_dep += 1;

            match self.visit(dep) {
                Visit::Resolved => continue,
                Visit::InProgress => {
                    return Err(ResolveError::CircularDependency {
                        from: node.name().clone(),
                        to: dep.clone(),
                    });
                }
                Visit::Unvisited => {}
            }

            let Some(dep_node) = self.lookup.get(dep) else {
                return Err(ResolveError::MissingDependency {
                    name: dep.clone(),
                    required_by: node.name().clone(),
                });
            };
            self.enter(dep_node, &mut stack);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::middleware::verify_correct_ordering;

    type Call = Arc<dyn Fn() + Send + Sync>;
    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recording(name: &'static str, log: &Log, deps: &[&'static str]) -> Node<Call> {
        let log = Arc::clone(log);
        Node::new(
            name,
            move |next: Call| -> Call {
                let log = Arc::clone(&log);
                Arc::new(move || {
                    log.lock().unwrap().push(name);
                    next();
                })
            },
            deps.iter().copied(),
        )
    }

    fn plain(name: &'static str, deps: &[&'static str]) -> Node<()> {
        Node::new(name, |next: ()| next, deps.iter().copied())
    }

    fn names<H>(resolver: &Resolver<H>) -> Vec<&str> {
        resolver.names().map(Name::as_str).collect()
    }

    #[test]
    fn orders_diamond_graph_and_runs_dependencies_first() {
        let log: Log = Arc::default();
        let resolver = Resolver::new(
            recording("a", &log, &["b", "d"]),
            [
                recording("b", &log, &["c", "e"]),
                recording("c", &log, &["d", "e"]),
                recording("e", &log, &[]),
                recording("d", &log, &["e"]),
            ],
        )
        .unwrap();

        assert!(verify_correct_ordering(resolver.ordered_middleware()));
        assert_eq!(names(&resolver), ["e", "d", "c", "b", "a"]);

        let terminal: Call = Arc::new(|| {});
        let handler = resolver.setup()(terminal);
        handler();
        assert_eq!(*log.lock().unwrap(), ["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn composed_chain_can_be_invoked_repeatedly() {
        let log: Log = Arc::default();
        let resolver = Resolver::new(recording("b", &log, &["a"]), [recording("a", &log, &[])]).unwrap();
        let setup = resolver.setup();

        let handler = setup(Arc::new(|| {}));
        handler();
        handler();
        setup(Arc::new(|| {}))();

        assert_eq!(*log.lock().unwrap(), ["a", "b", "a", "b", "a", "b"]);
    }

    #[test]
    fn detects_cycle_through_the_primary() {
        let err = Resolver::new(plain("a", &["b"]), [plain("b", &["c"]), plain("c", &["a"])]).unwrap_err();
        assert_eq!(err, ResolveError::CircularDependency { from: "c".into(), to: "a".into() });
    }

    #[test]
    fn detects_self_dependency() {
        let err = Resolver::new(plain("a", &["a"]), []).unwrap_err();
        assert!(matches!(err, ResolveError::CircularDependency { ref from, ref to } if from == "a" && to == "a"));
    }

    #[test]
    fn detects_cycle_below_the_primary() {
        let err = Resolver::new(
            plain("root", &["x"]),
            [plain("x", &["y"]), plain("y", &["z"]), plain("z", &["x"])],
        )
        .unwrap_err();
        assert_eq!(err, ResolveError::CircularDependency { from: "z".into(), to: "x".into() });
    }

    #[test]
    fn detects_missing_dependency() {
        let err = Resolver::new(plain("a", &["b"]), [plain("b", &["c"])]).unwrap_err();
        assert_eq!(err, ResolveError::MissingDependency { name: "c".into(), required_by: "b".into() });
        assert_eq!(err.to_string(), "missing dependency \"c\" required by \"b\"");
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Resolver::new(plain("a", &[]), [plain("b", &[]), plain("a", &["b"])]).unwrap_err();
        assert_eq!(err, ResolveError::DuplicateName { name: "a".into() });
    }

    #[test]
    fn shared_dependencies_are_emitted_once() {
        let resolver = Resolver::new(
            plain("app", &["auth", "log", "auth"]),
            [plain("auth", &["log"]), plain("log", &[])],
        )
        .unwrap();
        assert_eq!(names(&resolver), ["log", "auth", "app"]);
    }

    #[test]
    fn unreached_nodes_follow_in_supplied_order_without_validation() {
        // `x` and `y` form a cycle and `z` depends on a missing name; none of
        // them is reachable from the primary, so none of it is checked.
        let resolver = Resolver::new(
            plain("a", &["b"]),
            [
                plain("z", &["nowhere"]),
                plain("b", &[]),
                plain("y", &["x"]),
                plain("x", &["y"]),
            ],
        )
        .unwrap();
        assert_eq!(names(&resolver), ["b", "a", "z", "y", "x"]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let nodes = || {
            (
                plain("a", &["c"]),
                (0..32)
                    .map(|i| Node::new(format!("n{i}"), |next: ()| next, [] as [&str; 0]))
                    .chain([plain("c", &[])])
                    .collect::<Vec<_>>(),
            )
        };
        let (primary, rest) = nodes();
        let first = names(&Resolver::new(primary, rest).unwrap()).join(",");
        for _ in 0..8 {
            let (primary, rest) = nodes();
            assert_eq!(names(&Resolver::new(primary, rest).unwrap()).join(","), first);
        }
        assert!(first.starts_with("c,a,n0,n1,n2"));
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let depth = 50_000;
        let primary = Node::new("n0", |next: ()| next, ["n1"]);
        let rest = (1..depth).map(|i| {
            let deps: Vec<String> = if i + 1 < depth { vec![format!("n{}", i + 1)] } else { vec![] };
            Node::new(format!("n{i}"), |next: ()| next, deps)
        });
        let resolver = Resolver::new(primary, rest).unwrap();
        assert_eq!(resolver.len(), depth);
        assert_eq!(resolver.names().next().map(Name::as_str), Some(format!("n{}", depth - 1).as_str()));
        assert!(verify_correct_ordering(resolver.ordered_middleware()));
    }

    #[test]
    fn lookup_by_name() {
        let resolver = Resolver::new(plain("a", &["b"]), [plain("b", &[])]).unwrap();
        assert_eq!(resolver.get("b").map(|n| n.dependencies().len()), Some(0));
        assert!(resolver.get("c").is_none());
        assert!(!resolver.is_empty());
    }
}
