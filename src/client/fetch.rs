//! Fetching resources from Gopher servers.

use std::io;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::client::response::{Document, Response, ResponseBody};
use crate::error::{Error, Result};
use crate::gopher::directory::{Directory, MenuLine, scan_line};
use crate::gopher::item::{CRLF, DEFAULT_PORT, Item, ItemType};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gopher client.
#[derive(Debug, Clone)]
pub struct Client {
    /// Limit on establishing the TCP connection
    connect_timeout: Duration,

    /// Limit on each read of a menu line; none when unset
    read_timeout: Option<Duration>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
        }
    }
}

/// Builds the item a `gopher://` URI refers to.
///
/// `gopher://host[:port]/<type><selector>[?query]`. A path shorter than two
/// characters names the root menu. The query, if any, is appended to the
/// selector after a tab, which is how search servers receive their terms.
///
/// # Example
///
/// ```
/// # use burrow::client::item_for_uri;
/// # use burrow::gopher::item::ItemType;
/// let item = item_for_uri("gopher://example.org/7search?rust").unwrap();
/// assert_eq!(item.item_type, ItemType::IndexSearch);
/// assert_eq!(item.selector, "search\trust");
/// assert_eq!(item.port, 70);
/// ```
pub fn item_for_uri(uri: &str) -> Result<Item> {
    let url = Url::parse(uri).map_err(|e| match e {
        url::ParseError::EmptyHost
        | url::ParseError::IdnaError
        | url::ParseError::InvalidPort
        | url::ParseError::InvalidIpv4Address
        | url::ParseError::InvalidIpv6Address
        | url::ParseError::InvalidDomainCharacter => Error::InvalidAddress(format!("{uri}: {e}")),
        other => Error::InvalidUri(format!("{uri}: {other}")),
    })?;

    if url.scheme() != "gopher" {
        return Err(Error::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidAddress(format!("{uri}: missing host")))?;
    let port = url.port().unwrap_or(DEFAULT_PORT);

    let decoded = percent_decode_str(url.path()).decode_utf8_lossy();
    let path = decoded.strip_prefix('/').unwrap_or(decoded.as_ref());

    let mut chars = path.chars();
    let (item_type, selector) = match (chars.next(), path.chars().count()) {
        (Some(tag), len) if len >= 2 => {
            let item_type = ItemType::from_char(tag).ok_or(Error::UnknownItemType(tag))?;
            let mut selector = chars.as_str().to_string();
            if let Some(query) = url.query() {
                selector.push('\t');
                selector.push_str(query);
            }
            (item_type, selector)
        }
        _ => (ItemType::Directory, String::new()),
    };

    Ok(Item::new(item_type, "", selector).at(host, port))
}

impl Client {
    pub fn new(connect_timeout: Duration, read_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    /// Fetches the resource named by a `gopher://` URI.
    pub async fn get(&self, uri: &str) -> Result<Response> {
        let item = item_for_uri(uri)?;

        tracing::debug!(
            host = %item.host,
            port = item.port,
            selector = ?item.selector,
            item_type = %item.item_type,
            "Fetching"
        );

        let body = if item.item_type.is_directory_like() {
            ResponseBody::Directory(self.fetch_directory(&item).await?)
        } else {
            ResponseBody::Document(self.fetch_file(&item).await?)
        };

        Ok(Response {
            item_type: item.item_type,
            body,
        })
    }

    /// Requests a document. The returned stream ends when the server hangs up.
    pub async fn fetch_file(&self, item: &Item) -> Result<Document> {
        if item.item_type.is_directory_like() {
            return Err(Error::UnsupportedFetch("directory"));
        }

        let stream = self.send_selector(item).await?;
        Ok(Document::new(stream))
    }

    /// Requests a menu and reads it up to the `.` line or EOF.
    ///
    /// Lines that do not parse are logged and skipped.
    pub async fn fetch_directory(&self, item: &Item) -> Result<Directory> {
        if !item.item_type.is_directory_like() {
            return Err(Error::UnsupportedFetch("document"));
        }

        let stream = self.send_selector(item).await?;
        let mut reader = BufReader::new(stream);
        let mut dir = Directory::default();
        let mut line = Vec::new();

        loop {
            line.clear();
            let n = match self.read_timeout {
                Some(limit) => timeout(limit, reader.read_until(b'\n', &mut line))
                    .await
                    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "menu read timeout"))??,
                None => reader.read_until(b'\n', &mut line).await?,
            };

            if n == 0 {
                tracing::trace!(host = %item.host, "Menu ended without terminator");
                break;
            }

            match scan_line(&String::from_utf8_lossy(&line)) {
                MenuLine::End => break,
                MenuLine::Item(entry) => dir.push(entry),
                MenuLine::Blank | MenuLine::Dropped => {}
            }
        }

        Ok(dir)
    }

    async fn send_selector(&self, item: &Item) -> Result<TcpStream> {
        let addr = format!("{}:{}", item.host, item.port);

        let mut stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                io::Error::new(io::ErrorKind::TimedOut, format!("connecting to {addr} timed out"))
            })??;

        tracing::trace!(addr = %addr, "Connected");

        let mut request = Vec::with_capacity(item.selector.len() + CRLF.len());
        request.extend_from_slice(item.selector.as_bytes());
        request.extend_from_slice(CRLF);
        stream.write_all(&request).await?;
        stream.flush().await?;

        Ok(stream)
    }
}

/// Fetches `uri` with a default [`Client`].
pub async fn get(uri: &str) -> Result<Response> {
    Client::default().get(uri).await
}

/// Fetches a document item with a default [`Client`].
pub async fn fetch_file(item: &Item) -> Result<Document> {
    Client::default().fetch_file(item).await
}

/// Fetches a menu item with a default [`Client`].
pub async fn fetch_directory(item: &Item) -> Result<Directory> {
    Client::default().fetch_directory(item).await
}
