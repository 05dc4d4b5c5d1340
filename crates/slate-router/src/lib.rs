//! Path templates and route resolution for Slate.
//!
//! Routes are stored in a segment trie keyed by literal text and
//! placeholder name. Unlike a first-match router, [`Router::match_all`]
//! returns every route that matches, so the caller decides what "not found"
//! and "ambiguous" mean.
//!
//! # Example
//!
//! ```rust
//! use slate_router::{PathTemplate, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, PathTemplate::parse("/things").unwrap(), "listThings").unwrap();
//! router.insert(Method::GET, PathTemplate::parse("/things/{id}").unwrap(), "getThing").unwrap();
//! router.insert(Method::DELETE, PathTemplate::parse("/things/{id}").unwrap(), "deleteThing").unwrap();
//!
//! let matches = router.match_all(&Method::GET, "/things/123");
//! assert_eq!(matches.len(), 1);
//! assert_eq!(*matches[0].value, "getThing");
//! assert_eq!(matches[0].params.get("id"), Some("123"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                (root)
//!                  │
//!              "things"
//!             [GET list]
//!                  │
//!               "{id}"
//!         [GET get, DELETE delete]
//! ```

mod method_router;
mod node;
mod params;
mod router;
mod template;

pub use method_router::MethodRouter;
pub use node::Node;
pub use params::Params;
pub use router::{RouteConflict, Router};
pub use template::{PathTemplate, Segment, TemplateError};

/// A matched route with its stored value and captured placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched route
    pub value: &'a T,
    /// Captured placeholder values, percent-decoded
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(value: &'a T, params: Params) -> Self {
        Self { value, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn t(path: &str) -> PathTemplate {
        PathTemplate::parse(path).unwrap()
    }

    #[test]
    fn test_basic_routing() {
        let mut router = Router::new();
        router.insert(Method::GET, t("/users"), "listUsers").unwrap();
        router.insert(Method::GET, t("/users/{id}"), "getUser").unwrap();

        let m = &router.match_all(&Method::GET, "/users")[0];
        assert_eq!(*m.value, "listUsers");
        assert!(m.params.is_empty());

        let m = &router.match_all(&Method::GET, "/users/123")[0];
        assert_eq!(*m.value, "getUser");
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_multiple_params() {
        let mut router = Router::new();
        router
            .insert(Method::GET, t("/orgs/{orgId}/users/{userId}"), "getOrgUser")
            .unwrap();

        let m = &router.match_all(&Method::GET, "/orgs/acme/users/123")[0];
        assert_eq!(m.params.get("orgId"), Some("acme"));
        assert_eq!(m.params.get("userId"), Some("123"));
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let mut router = Router::new();
        router.insert(Method::GET, t("/users"), "listUsers").unwrap();
        assert_eq!(router.match_all(&Method::GET, "/users/").len(), 1);
    }
}
