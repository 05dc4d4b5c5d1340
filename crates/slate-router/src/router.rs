//! High-level router API.
//!
//! [`Router`] stores values by `(method, template)` and refuses any template
//! that overlaps one already registered for the same method. Lookups return
//! every match so callers can tell "none" from "more than one".

use std::fmt;

use http::Method;

use crate::node::Node;
use crate::template::PathTemplate;
use crate::RouteMatch;

/// Error returned when a template would be ambiguous with an existing route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConflict {
    /// HTTP method shared by both routes.
    pub method: Method,
    /// The template already registered.
    pub existing: PathTemplate,
    /// The template that was rejected.
    pub rejected: PathTemplate,
}

impl fmt::Display for RouteConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} overlaps already registered {} {}",
            self.method, self.rejected, self.method, self.existing
        )
    }
}

impl std::error::Error for RouteConflict {}

/// A segment-trie router generic over the stored value.
///
/// # Example
///
/// ```rust
/// use slate_router::{PathTemplate, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router
///     .insert(Method::GET, PathTemplate::parse("/path/thing/{id}").unwrap(), "getThing")
///     .unwrap();
///
/// let matches = router.match_all(&Method::GET, "/path/thing/42");
/// assert_eq!(matches.len(), 1);
/// assert_eq!(*matches[0].value, "getThing");
/// assert_eq!(matches[0].params.get("id"), Some("42"));
///
/// // Same verb, same shape: rejected.
/// let clash = PathTemplate::parse("/path/thing/{name}").unwrap();
/// assert!(router.insert(Method::GET, clash, "findThing").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    /// Root node of the trie
    root: Node<T>,
    /// Every registered route, in insertion order
    routes: Vec<(Method, PathTemplate)>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            routes: Vec::new(),
        }
    }

    /// Inserts a route.
    ///
    /// Fails if a template registered for the same method overlaps
    /// `template` (see [`PathTemplate::overlaps`]).
    pub fn insert(
        &mut self,
        method: Method,
        template: PathTemplate,
        value: T,
    ) -> Result<(), RouteConflict> {
        if let Some((_, existing)) = self
            .routes
            .iter()
            .find(|(m, t)| *m == method && t.overlaps(&template))
        {
            return Err(RouteConflict {
                method,
                existing: existing.clone(),
                rejected: template,
            });
        }

        self.root
            .descend_or_insert(template.segments())
            .methods
            .insert(method.clone(), value);
        self.routes.push((method, template));
        Ok(())
    }

    /// Returns every route registered for `method` whose template matches
    /// `path`.
    #[must_use]
    pub fn match_all(&self, method: &Method, path: &str) -> Vec<RouteMatch<'_, T>> {
        let mut nodes = Vec::new();
        self.root.match_all(path, &mut nodes);
        nodes
            .into_iter()
            .filter_map(|(node, params)| {
                node.methods
                    .get(method)
                    .map(|value| RouteMatch::new(value, params))
            })
            .collect()
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
