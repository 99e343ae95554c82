//! The shared, mutable route table.
//!
//! The table is copy-on-write: readers load the current `Arc<Vec<_>>` and scan
//! it without taking any lock, while writers serialize on a mutex, build the
//! next vector and publish it with a single atomic swap. A reader therefore
//! sees either the table before a write or the table after it, never a
//! partially updated one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::request::{Method, Params};
use crate::route::Route;

/// An immutable view of the table at one instant.
pub type Snapshot = Arc<Vec<Arc<Route>>>;

/// Ordered routes; the first matching route wins.
pub struct RouteTable {
    routes: ArcSwap<Vec<Arc<Route>>>,
    writer: Mutex<()>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Appends routes, keeping their order, in one atomic step.
    ///
    /// Returns the shared handles of the appended routes.
    pub fn add<I>(&self, routes: I) -> Vec<Arc<Route>>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Route>>,
    {
        let added: Vec<Arc<Route>> = routes.into_iter().map(Into::into).collect();
        if added.is_empty() {
            return added;
        }

        let _guard = self.writer.lock();
        let current = self.routes.load_full();
        let mut next = Vec::with_capacity(current.len() + added.len());
        next.extend(current.iter().cloned());
        next.extend(added.iter().cloned());
        let len = next.len();
        self.routes.store(Arc::new(next));

        debug!(added = added.len(), routes = len, "Routes added");
        added
    }

    /// Removes the given routes (by identity) in one atomic step.
    ///
    /// Returns how many table entries were removed.
    pub fn remove(&self, routes: &[Arc<Route>]) -> usize {
        let _guard = self.writer.lock();
        let current = self.routes.load_full();
        let next: Vec<Arc<Route>> = current
            .iter()
            .filter(|route| !routes.iter().any(|r| Route::same(route, r)))
            .cloned()
            .collect();

        let removed = current.len() - next.len();
        if removed > 0 {
            let len = next.len();
            self.routes.store(Arc::new(next));
            debug!(removed, routes = len, "Routes removed");
        }
        removed
    }

    /// Removes every route.
    pub fn clear(&self) {
        let _guard = self.writer.lock();
        self.routes.store(Arc::new(Vec::new()));
    }

    /// Finds the first route matching `method` and `path`.
    #[must_use]
    pub fn match_route(&self, method: Method, path: &str) -> Option<(Arc<Route>, Params)> {
        self.routes
            .load()
            .iter()
            .find_map(|route| route.matches(method, path).map(|params| (Arc::clone(route), params)))
    }

    /// Returns the current routes.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.routes.load_full()
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    /// Returns true if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Flow};

    fn route(method: &str, pattern: &str) -> Route {
        Route::new(method, pattern, from_fn(|_, _, _| Flow::Handled)).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new();
        let added = table.add([route("GET", "/users/:id"), route("GET", "/users/admin")]);

        let (matched, params) = table.match_route(Method::Get, "/users/admin").unwrap();
        assert!(Route::same(&matched, &added[0]));
        assert_eq!(params.get("id"), "admin");
    }

    #[test]
    fn test_method_filter() {
        let table = RouteTable::new();
        table.add([route("POST", "/items")]);
        assert!(table.match_route(Method::Get, "/items").is_none());
        assert!(table.match_route(Method::Post, "/items").is_some());

        table.add([route("*", "/items")]);
        assert!(table.match_route(Method::Get, "/items").is_some());
    }

    #[test]
    fn test_remove_by_identity() {
        let table = RouteTable::new();
        let first = table.add([route("GET", "/a")]);
        let second = table.add([route("GET", "/a")]);
        assert_eq!(table.len(), 2);

        assert_eq!(table.remove(&first), 1);
        assert_eq!(table.remove(&first), 0);
        assert_eq!(table.len(), 1);

        let (matched, _) = table.match_route(Method::Get, "/a").unwrap();
        assert!(Route::same(&matched, &second[0]));
    }

    #[test]
    fn test_readd_removed_route() {
        let table = RouteTable::new();
        let handles = table.add([route("GET", "/a")]);
        table.remove(&handles);
        assert!(table.is_empty());

        table.add(handles.iter().cloned());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let table = RouteTable::new();
        table.add([route("GET", "/a")]);
        let snapshot = table.snapshot();

        table.add([route("GET", "/b")]);
        table.clear();

        assert_eq!(snapshot.len(), 1);
        assert!(table.is_empty());
        assert!(table.match_route(Method::Get, "/a").is_none());
    }

    #[test]
    fn test_empty_add_is_noop() {
        let table = RouteTable::new();
        assert!(table.add(Vec::<Route>::new()).is_empty());
        assert!(table.is_empty());
    }
}
