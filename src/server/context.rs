use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::gopher::request::Request;
use crate::server::handler::Handler;

/// Callback receiving server-level error messages.
pub type ErrorSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Everything a connection needs from the server that accepted it.
pub struct ServeContext {
    /// Address the listener is bound to
    pub local_addr: SocketAddr,
    /// Hostname to advertise instead of the bound IP
    pub hostname: Option<String>,
    pub handler: Arc<dyn Handler>,
    pub error_sink: Option<ErrorSink>,
    /// Limit on waiting for the request line
    pub read_timeout: Option<Duration>,
}

impl ServeContext {
    /// Builds the request a handler sees for `selector`.
    ///
    /// The configured hostname wins over the bound address; the port is
    /// always the one actually listened on.
    pub fn request(&self, selector: String) -> Request {
        let host = match &self.hostname {
            Some(hostname) => hostname.clone(),
            None => self.local_addr.ip().to_string(),
        };
        Request::new(selector, host, self.local_addr.port())
    }

    /// Logs an error and forwards it to the error sink, if any.
    pub fn report(&self, msg: &str) {
        tracing::error!("{}", msg);
        if let Some(sink) = &self.error_sink {
            sink(msg);
        }
    }
}
