use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::net::TcpStream;

use crate::error::Result;
use crate::gopher::directory::Directory;
use crate::gopher::item::ItemType;

/// A fetched Gopher resource.
///
/// Which body is present depends only on the requested item type, decided
/// before anything is read.
#[derive(Debug)]
pub struct Response {
    pub item_type: ItemType,
    pub body: ResponseBody,
}

#[derive(Debug)]
pub enum ResponseBody {
    Directory(Directory),
    Document(Document),
}

impl Response {
    pub fn is_directory(&self) -> bool {
        matches!(self.body, ResponseBody::Directory(_))
    }

    pub fn directory(&self) -> Option<&Directory> {
        match &self.body {
            ResponseBody::Directory(dir) => Some(dir),
            ResponseBody::Document(_) => None,
        }
    }

    pub fn into_directory(self) -> Option<Directory> {
        match self.body {
            ResponseBody::Directory(dir) => Some(dir),
            ResponseBody::Document(_) => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self.body {
            ResponseBody::Document(doc) => Some(doc),
            ResponseBody::Directory(_) => None,
        }
    }
}

/// Live connection streaming a document.
///
/// The server marks the end of the document by closing the connection, so
/// read until EOF and then drop it.
#[derive(Debug)]
pub struct Document {
    stream: TcpStream,
}

impl Document {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Reads the whole document.
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.stream.read_to_end(&mut body).await?;
        Ok(body)
    }
}

impl AsyncRead for Document {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}
