//! Error types shared by the protocol, client, router and file server.

use thiserror::Error;

/// Convenience alias for results using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the Gopher engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A menu line without a type tag.
    #[error("malformed item: no item type in {0:?}")]
    MalformedItem(String),

    /// A menu line whose type tag is not part of the item type enumeration.
    #[error("unknown item type {0:?}")]
    UnknownItemType(char),

    /// The port field of a non-informational item is not a number.
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    /// Document bytes written to a menu response or vice versa.
    #[error("cannot write {attempted} data to a {current} response")]
    ModeConflict {
        /// The mode the response is already bound to.
        current: &'static str,
        /// The mode the rejected call needs.
        attempted: &'static str,
    },

    /// URI scheme other than `gopher`.
    #[error("invalid scheme {0:?} for gopher uri")]
    InvalidScheme(String),

    /// The URI could not be parsed at all.
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    /// The host or port part of a URI is unusable.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Directory fetch on a document item, or document fetch on a directory.
    #[error("cannot fetch a {0} item this way")]
    UnsupportedFetch(&'static str),

    /// Filesystem path containing a NUL or a native separator.
    #[error("invalid character in file path {0:?}")]
    InvalidPath(String),

    /// Router registration with an empty pattern.
    #[error("invalid empty pattern")]
    EmptyPattern,

    /// A pattern was explicitly registered twice.
    #[error("multiple registrations for {0}")]
    DuplicatePattern(String),

    /// The connection was closed before the response could be flushed.
    #[error("connection closed")]
    ConnectionClosed,

    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport or filesystem I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
