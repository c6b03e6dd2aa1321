//! Read-only filesystem capability consumed by the file server.
//!
//! Paths handed to [`FileSystem::open`] are `/`-separated regardless of
//! platform and are cleaned so that `..` never climbs above the root.

use std::io;
use std::path::{MAIN_SEPARATOR, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Regular,
    /// Symlinks, sockets, devices
    Other,
}

/// What a listing or stat knows about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub kind: FileKind,
    pub len: u64,
}

impl FileInfo {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// A tree of named files.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Human-readable root, for diagnostics.
    fn name(&self) -> String;

    async fn open(&self, name: &str) -> Result<Box<dyn File>>;
}

/// An open file or directory. Dropping it closes it.
#[async_trait]
pub trait File: AsyncRead + AsyncSeek + Send + Unpin {
    async fn stat(&mut self) -> io::Result<FileInfo>;

    /// Entries of a directory, in no particular order.
    async fn read_dir(&mut self) -> io::Result<Vec<FileInfo>>;
}

/// Lexically cleans a `/`-separated path and roots it at `/`.
///
/// # Example
///
/// ```
/// # use burrow::fs::clean_path;
/// assert_eq!(clean_path("a/./b/../c"), "/a/c");
/// assert_eq!(clean_path("/../../etc/passwd"), "/etc/passwd");
/// assert_eq!(clean_path(""), "/");
/// ```
pub fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }

    format!("/{}", parts.join("/"))
}

/// The native filesystem below a root directory.
#[derive(Debug, Clone)]
pub struct Dir {
    root: PathBuf,
}

impl Dir {
    /// An empty root means the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root
        };
        Self { root }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.contains('\0') || (MAIN_SEPARATOR != '/' && name.contains(MAIN_SEPARATOR)) {
            return Err(Error::InvalidPath(name.to_string()));
        }

        let mut path = self.root.clone();
        for part in clean_path(name).split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        Ok(path)
    }
}

#[async_trait]
impl FileSystem for Dir {
    fn name(&self) -> String {
        self.root.display().to_string()
    }

    async fn open(&self, name: &str) -> Result<Box<dyn File>> {
        let path = self.resolve(name)?;
        let meta = tokio::fs::metadata(&path).await?;

        let handle = if meta.is_dir() {
            OsHandle::Directory
        } else {
            OsHandle::Regular(tokio::fs::File::open(&path).await?)
        };

        Ok(Box::new(OsFile { path, handle }))
    }
}

enum OsHandle {
    Regular(tokio::fs::File),
    Directory,
}

struct OsFile {
    path: PathBuf,
    handle: OsHandle,
}

fn kind_of(file_type: std::fs::FileType) -> FileKind {
    if file_type.is_dir() {
        FileKind::Directory
    } else if file_type.is_file() {
        FileKind::Regular
    } else {
        FileKind::Other
    }
}

fn is_a_directory() -> io::Error {
    io::Error::other("is a directory")
}

#[async_trait]
impl File for OsFile {
    async fn stat(&mut self) -> io::Result<FileInfo> {
        let meta = match &self.handle {
            OsHandle::Regular(file) => file.metadata().await?,
            OsHandle::Directory => tokio::fs::metadata(&self.path).await?,
        };

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());

        Ok(FileInfo {
            name,
            kind: kind_of(meta.file_type()),
            len: meta.len(),
        })
    }

    async fn read_dir(&mut self) -> io::Result<Vec<FileInfo>> {
        if let OsHandle::Regular(_) = self.handle {
            return Err(io::Error::other("not a directory"));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.path).await?;

        while let Some(entry) = dir.next_entry().await? {
            // lstat semantics: symlinks are reported as such, not followed
            let meta = entry.metadata().await?;
            entries.push(FileInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind_of(meta.file_type()),
                len: meta.len(),
            });
        }

        Ok(entries)
    }
}

impl AsyncRead for OsFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().handle {
            OsHandle::Regular(file) => Pin::new(file).poll_read(cx, buf),
            OsHandle::Directory => Poll::Ready(Err(is_a_directory())),
        }
    }
}

impl AsyncSeek for OsFile {
    fn start_seek(self: Pin<&mut Self>, position: io::SeekFrom) -> io::Result<()> {
        match &mut self.get_mut().handle {
            OsHandle::Regular(file) => Pin::new(file).start_seek(position),
            OsHandle::Directory => Err(is_a_directory()),
        }
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        match &mut self.get_mut().handle {
            OsHandle::Regular(file) => Pin::new(file).poll_complete(cx),
            OsHandle::Directory => Poll::Ready(Ok(0)),
        }
    }
}
