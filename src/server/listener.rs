use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{Instrument, info, info_span};

use crate::config::ServerConfig;
use crate::gopher::connection::Connection;
use crate::server::context::{ErrorSink, ServeContext};
use crate::server::handler::Handler;
use crate::server::router::default_router;

/// A Gopher server. `Server::new(ServerConfig::default())` is a valid
/// server listening on port 70 and dispatching to the default router.
pub struct Server {
    config: ServerConfig,
    handler: Option<Arc<dyn Handler>>,
    error_sink: Option<ErrorSink>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            handler: None,
            error_sink: None,
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_error_sink(mut self, sink: ErrorSink) -> Self {
        self.error_sink = Some(sink);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn context(&self, local_addr: SocketAddr) -> Arc<ServeContext> {
        let handler: Arc<dyn Handler> = match &self.handler {
            Some(handler) => handler.clone(),
            None => default_router(),
        };

        Arc::new(ServeContext {
            local_addr,
            hostname: self.config.hostname.clone(),
            handler,
            error_sink: self.error_sink.clone(),
            read_timeout: self.config.read_timeout(),
        })
    }

    /// Binds the configured address and serves until accepting fails.
    pub async fn listen_and_serve(&self) -> anyhow::Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Listening on {}", addr);
        self.serve(listener).await
    }

    /// Accepts connections on `listener`, one task per connection.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        if self.config.max_connections == Some(0) {
            anyhow::bail!("max_connections must be at least 1");
        }

        let ctx = self.context(listener.local_addr()?);
        let limit = self.config.max_connections.map(|n| Arc::new(Semaphore::new(n)));

        loop {
            let permit = match &limit {
                Some(sem) => Some(sem.clone().acquire_owned().await?),
                None => None,
            };

            let (socket, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    ctx.report(&format!("error accepting new client: {e}"));
                    return Err(e.into());
                }
            };
            tracing::debug!("Accepted connection from {}", peer);

            let conn = Connection::new(socket, ctx.clone());
            let span = info_span!("conn", %peer);
            tokio::spawn(
                async move {
                    if let Err(e) = conn.run().await {
                        tracing::debug!(error = %e, "Connection closed with error");
                    }
                    drop(permit);
                }
                .instrument(span),
            );
        }
    }

    /// Serves a single already-established transport, such as a TLS
    /// stream, that arrived on `local_addr`.
    pub async fn serve_stream<S>(&self, stream: S, local_addr: SocketAddr) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Connection::new(stream, self.context(local_addr)).run().await
    }
}

/// Serves `handler` (or the default router) on `addr`.
///
/// ```no_run
/// # async fn run() -> anyhow::Result<()> {
/// burrow::server::handle_fn("/hello", |w, _req| {
///     w.write_info("hello, world!")?;
///     Ok(())
/// })?;
/// burrow::server::listen_and_serve("localhost:7000", None).await
/// # }
/// ```
pub async fn listen_and_serve(addr: &str, handler: Option<Arc<dyn Handler>>) -> anyhow::Result<()> {
    let config = ServerConfig {
        listen_addr: Some(addr.to_string()),
        ..ServerConfig::default()
    };

    let mut server = Server::new(config);
    if let Some(handler) = handler {
        server = server.with_handler(handler);
    }
    server.listen_and_serve().await
}
