//! Gopher server: listener, routing and handlers.

pub mod context;
pub mod handler;
pub mod listener;
pub mod router;

pub use context::{ErrorSink, ServeContext};
pub use handler::{Handler, HandlerFn, NotFound, not_found_handler};
pub use listener::{Server, listen_and_serve};
pub use router::{Router, default_router, handle, handle_fn};
