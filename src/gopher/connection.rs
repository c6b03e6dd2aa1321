use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadHalf};

use crate::gopher::item::{CRLF, END, Item};
use crate::gopher::parser::{ParseError, parse_request_line, parse_unterminated};
use crate::gopher::request::Request;
use crate::gopher::writer::{Outbound, ResponseWriter};
use crate::server::context::ServeContext;

/// Server side of one Gopher connection.
///
/// A connection carries exactly one request; there is no keep-alive.
pub struct Connection<S> {
    reader: ReadHalf<S>,
    outbound: Outbound,
    buffer: Vec<u8>,
    ctx: Arc<ServeContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Accepted,
    RequestRead(Request),
    Dispatched(ResponseWriter),
    Closed,
}

/// Why no request came out of the read phase.
#[derive(Debug)]
enum ReadFailure {
    /// Client went away or took too long; nobody to answer.
    Hangup,
    /// Client sent something we cannot serve.
    BadRequest(String),
}

fn is_hangup(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S, ctx: Arc<ServeContext>) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader,
            outbound: Outbound::new(writer),
            buffer: Vec::with_capacity(1024),
            ctx,
            state: ConnectionState::Accepted,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Accepted => match self.read_request().await {
                    Ok(req) => {
                        self.state = ConnectionState::RequestRead(req);
                    }
                    Err(ReadFailure::Hangup) => {
                        tracing::debug!("Client hung up before sending a selector");
                    }
                    Err(ReadFailure::BadRequest(reason)) => {
                        tracing::warn!(reason = %reason, "Bad request");
                        self.reply_bad_request().await;
                    }
                },

                ConnectionState::RequestRead(req) => {
                    let mut writer = ResponseWriter::new(self.outbound.clone(), &req);
                    self.dispatch(&mut writer, &req).await;
                    self.state = ConnectionState::Dispatched(writer);
                }

                ConnectionState::Dispatched(writer) => {
                    if let Err(e) = writer.finish().await {
                        tracing::debug!(error = %e, "Failed to finish response");
                    }
                }

                ConnectionState::Closed => {
                    self.outbound.close().await?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> Result<Request, ReadFailure> {
        let read_timeout = self.ctx.read_timeout;
        let selector = match read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_selector())
                .await
                .map_err(|_| ReadFailure::Hangup)??,
            None => self.read_selector().await?,
        };

        Ok(self.ctx.request(selector))
    }

    async fn read_selector(&mut self) -> Result<String, ReadFailure> {
        loop {
            match parse_request_line(&self.buffer) {
                Ok((selector, consumed)) => {
                    self.buffer.drain(..consumed);
                    return Ok(selector);
                }

                Err(ParseError::Incomplete) => {
                    // need more data
                }

                Err(e) => {
                    return Err(ReadFailure::BadRequest(format!("{e:?}")));
                }
            }

            let mut temp = [0u8; 1024];
            let n = match self.reader.read(&mut temp).await {
                Ok(n) => n,
                Err(e) if is_hangup(&e) => return Err(ReadFailure::Hangup),
                Err(e) => return Err(ReadFailure::BadRequest(e.to_string())),
            };

            if n == 0 {
                if self.buffer.is_empty() {
                    return Err(ReadFailure::Hangup);
                }
                let rest = std::mem::take(&mut self.buffer);
                return parse_unterminated(&rest)
                    .map_err(|e| ReadFailure::BadRequest(format!("{e:?}")));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    /// Runs the handler, isolating its errors and panics to this connection.
    async fn dispatch(&self, writer: &mut ResponseWriter, req: &Request) {
        tracing::debug!(selector = %req.selector, "Dispatching");

        let outcome = AssertUnwindSafe(self.ctx.handler.serve_gopher(writer, req))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.ctx
                    .report(&format!("handler for {} failed: {:#}", req.selector, e));
            }
            Err(panic) => {
                self.ctx.report(&format!(
                    "handler for {} panicked: {}",
                    req.selector,
                    panic_message(panic.as_ref())
                ));
            }
        }
    }

    async fn reply_bad_request(&self) {
        let mut reply = Item::error("bad request").to_bytes();
        reply.push(END);
        reply.extend_from_slice(CRLF);

        if let Err(e) = self.outbound.write_all(&reply).await {
            tracing::debug!(error = %e, "Failed to send bad request reply");
        }
    }
}
