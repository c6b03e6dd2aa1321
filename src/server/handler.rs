//! Request handlers.
//!
//! A [`Handler`] answers one request by writing to a [`ResponseWriter`].
//! Returning ends the request: the connection terminates the menu (if
//! any), flushes and hangs up. The writer must not be kept past the call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::gopher::request::Request;
use crate::gopher::writer::ResponseWriter;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve_gopher(&self, w: &mut ResponseWriter, req: &Request) -> anyhow::Result<()>;
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    async fn serve_gopher(&self, w: &mut ResponseWriter, req: &Request) -> anyhow::Result<()> {
        (**self).serve_gopher(w, req).await
    }
}

/// Adapter that lets a plain function act as a [`Handler`].
///
/// # Example
///
/// ```
/// # use burrow::server::handler::HandlerFn;
/// let hello = HandlerFn::new(|w, _req| {
///     w.write_info("hello, world!")?;
///     Ok(())
/// });
/// ```
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &Request) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &Request) -> anyhow::Result<()> + Send + Sync,
{
    async fn serve_gopher(&self, w: &mut ResponseWriter, req: &Request) -> anyhow::Result<()> {
        (self.f)(w, req)
    }
}

/// Replies with an error line carrying `msg`.
///
/// Does not end the response; callers should not write anything else.
pub fn error(w: &mut ResponseWriter, msg: &str) -> Result<()> {
    w.write_error(msg)
}

/// Replies to every request with "resource not found".
pub struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn serve_gopher(&self, w: &mut ResponseWriter, _req: &Request) -> anyhow::Result<()> {
        error(w, "resource not found")?;
        Ok(())
    }
}

pub fn not_found_handler() -> Arc<dyn Handler> {
    Arc::new(NotFound)
}
