//! HTTP method table for a single trie node.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to values for one path.
///
/// # Example
///
/// ```rust
/// use slate_router::MethodRouter;
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// methods.insert(Method::GET, "getThing");
/// methods.insert(Method::DELETE, "deleteThing");
///
/// assert_eq!(methods.get(&Method::GET), Some(&"getThing"));
/// assert_eq!(methods.get(&Method::POST), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 4]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` for `method`, returning the value it replaced.
    pub fn insert(&mut self, method: Method, value: T) -> Option<T> {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            return Some(std::mem::replace(existing, value));
        }
        self.entries.push((method, value));
        None
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, value)| value)
    }

    /// Returns true if no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
