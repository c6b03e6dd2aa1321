//! Serving files over Gopher.
//!
//! - **`filesystem`**: the read-only [`FileSystem`] capability and [`Dir`]
//! - **`detector`**: decides the item type of a file
//! - **`file_server`**: the [`FileServer`] handler

pub mod detector;
pub mod file_server;
pub mod filesystem;

pub use detector::{TypeDetector, sniff};
pub use file_server::{FileServer, GOPHERMAP};
pub use filesystem::{Dir, File, FileInfo, FileKind, FileSystem, clean_path};
