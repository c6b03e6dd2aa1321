use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::gopher::item::{CRLF, END, Item};
use crate::gopher::request::Request;

type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Write side of a connection, shared by the connection and its response writer.
///
/// The mutex serializes writes against closing, so a close triggered from
/// outside the handler cannot race a flush. Once closed every write fails
/// with [`Error::ConnectionClosed`].
#[derive(Clone)]
pub struct Outbound {
    inner: Arc<Mutex<Option<BoxedWrite>>>,
}

impl Outbound {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(writer)))),
        }
    }

    /// Writes and flushes `buf`.
    pub async fn write_all(&self, buf: &[u8]) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let stream = guard.as_mut().ok_or(Error::ConnectionClosed)?;
        stream.write_all(buf).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Shuts the transport down. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        let taken = self.inner.lock().await.take();
        if let Some(mut stream) = taken {
            stream.shutdown().await?;
        }
        Ok(())
    }
}

/// Shape a response has committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Nothing written yet
    Undetermined,
    /// Raw bytes, ended by closing the connection
    Document,
    /// Menu lines, ended by the `.` line
    Menu,
}

impl WriteMode {
    fn name(&self) -> &'static str {
        match self {
            WriteMode::Undetermined => "undetermined",
            WriteMode::Document => "document",
            WriteMode::Menu => "menu",
        }
    }
}

/// Builds the reply to one request.
///
/// The first write fixes the mode: [`write`](Self::write) commits to a
/// document, [`write_item`](Self::write_item) and friends to a menu. Output
/// is buffered until [`flush`](Self::flush) or [`finish`](Self::finish).
pub struct ResponseWriter {
    outbound: Outbound,
    buffer: BytesMut,
    mode: WriteMode,
    local_host: String,
    local_port: u16,
}

impl ResponseWriter {
    pub fn new(outbound: Outbound, request: &Request) -> Self {
        Self {
            outbound,
            buffer: BytesMut::with_capacity(4096),
            mode: WriteMode::Undetermined,
            local_host: request.local_host.clone(),
            local_port: request.local_port,
        }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    fn enter(&mut self, wanted: WriteMode) -> Result<()> {
        if self.mode == WriteMode::Undetermined {
            self.mode = wanted;
        }

        if self.mode != wanted {
            return Err(Error::ModeConflict {
                current: self.mode.name(),
                attempted: wanted.name(),
            });
        }

        Ok(())
    }

    /// Appends document bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.enter(WriteMode::Document)?;
        self.buffer.extend_from_slice(data);
        Ok(data.len())
    }

    /// Appends a menu line.
    ///
    /// An item with neither host nor port points back at this server.
    pub fn write_item(&mut self, mut item: Item) -> Result<()> {
        self.enter(WriteMode::Menu)?;

        if item.host.is_empty() && item.port == 0 {
            item.host = self.local_host.clone();
            item.port = self.local_port;
        }

        let mut line = Vec::new();
        item.write_to(&mut line);
        self.buffer.extend_from_slice(&line);
        Ok(())
    }

    /// Appends an informational line, or the bare text in a document.
    pub fn write_info(&mut self, msg: &str) -> Result<()> {
        self.write_message(Item::info(msg))
    }

    /// Appends an error line, or the bare text in a document.
    pub fn write_error(&mut self, msg: &str) -> Result<()> {
        self.write_message(Item::error(msg))
    }

    fn write_message(&mut self, item: Item) -> Result<()> {
        if self.mode == WriteMode::Document {
            self.buffer.extend_from_slice(item.description.as_bytes());
            return Ok(());
        }
        self.write_item(item)
    }

    /// Sends everything buffered so far.
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let chunk = self.buffer.split().freeze();
        self.outbound.write_all(&chunk).await
    }

    /// Terminates a menu, flushes, and closes the connection.
    ///
    /// The connection is closed even when the flush fails; the first error
    /// is returned.
    pub async fn finish(mut self) -> Result<()> {
        if self.mode == WriteMode::Menu {
            self.buffer.extend_from_slice(&[END]);
            self.buffer.extend_from_slice(CRLF);
        }

        let flushed = self.flush().await;
        let closed = self.outbound.close().await;
        flushed.and(closed)
    }
}
