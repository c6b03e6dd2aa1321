//! Selector multiplexer.
//!
//! Patterns name fixed selectors like `/about`, or subtrees like
//! `/images/` (note the trailing slash). The longest matching pattern
//! wins, so with both `/images/` and `/images/thumbs/` registered the
//! latter receives `/images/thumbs/a.png` and the former everything else
//! under `/images/`. Since `/` names a subtree it catches every selector
//! no other pattern claims.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::gopher::request::Request;
use crate::gopher::writer::ResponseWriter;
use crate::server::handler::{Handler, HandlerFn, not_found_handler};

struct RouteEntry {
    handler: Arc<dyn Handler>,
    pattern: String,
}

pub struct Router {
    routes: RwLock<HashMap<String, RouteEntry>>,
    not_found: Arc<dyn Handler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Does `selector` fall under `pattern`?
fn selector_match(pattern: &str, selector: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    if pattern.ends_with('/') {
        selector.starts_with(pattern)
    } else {
        pattern == selector
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            not_found: not_found_handler(),
        }
    }

    /// Registers `handler` for `pattern`.
    ///
    /// Registering the same pattern twice is a configuration mistake and
    /// fails with [`Error::DuplicatePattern`]; the first registration stays.
    pub fn handle<H>(&self, pattern: &str, handler: H) -> Result<()>
    where
        H: Handler + 'static,
    {
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }

        let mut routes = self.routes.write();

        if routes.contains_key(pattern) {
            return Err(Error::DuplicatePattern(pattern.to_string()));
        }

        routes.insert(
            pattern.to_string(),
            RouteEntry {
                handler: Arc::new(handler),
                pattern: pattern.to_string(),
            },
        );

        tracing::debug!(pattern, "Registered handler");
        Ok(())
    }

    /// Registers a plain function for `pattern`.
    pub fn handle_fn<F>(&self, pattern: &str, f: F) -> Result<()>
    where
        F: Fn(&mut ResponseWriter, &Request) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handle(pattern, HandlerFn::new(f))
    }

    /// Resolves the handler for `selector` along with the pattern that matched.
    ///
    /// Falls back to the not-found handler and an empty pattern.
    pub fn handler(&self, selector: &str) -> (Arc<dyn Handler>, String) {
        let routes = self.routes.read();

        let best = routes
            .values()
            .filter(|entry| selector_match(&entry.pattern, selector))
            .max_by_key(|entry| entry.pattern.len());

        match best {
            Some(entry) => (entry.handler.clone(), entry.pattern.clone()),
            None => (self.not_found.clone(), String::new()),
        }
    }

    /// Registered patterns, sorted.
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.routes.read().keys().cloned().collect();
        patterns.sort();
        patterns
    }
}

#[async_trait]
impl Handler for Router {
    async fn serve_gopher(&self, w: &mut ResponseWriter, req: &Request) -> anyhow::Result<()> {
        let (handler, pattern) = self.handler(&req.selector);
        tracing::debug!(selector = %req.selector, pattern = %pattern, "Dispatching request");
        handler.serve_gopher(w, req).await
    }
}

static DEFAULT_ROUTER: OnceLock<Arc<Router>> = OnceLock::new();

/// Process-wide router used by servers configured without a handler.
pub fn default_router() -> Arc<Router> {
    DEFAULT_ROUTER.get_or_init(|| Arc::new(Router::new())).clone()
}

/// Registers `handler` for `pattern` on the [`default_router`].
pub fn handle<H>(pattern: &str, handler: H) -> Result<()>
where
    H: Handler + 'static,
{
    default_router().handle(pattern, handler)
}

/// Registers a plain function for `pattern` on the [`default_router`].
pub fn handle_fn<F>(pattern: &str, f: F) -> Result<()>
where
    F: Fn(&mut ResponseWriter, &Request) -> anyhow::Result<()> + Send + Sync + 'static,
{
    default_router().handle_fn(pattern, f)
}
