use std::io::SeekFrom;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::Result;
use crate::fs::detector::TypeDetector;
use crate::fs::filesystem::{File, FileKind, FileSystem, clean_path};
use crate::gopher::item::{Item, ItemType};
use crate::gopher::request::Request;
use crate::gopher::writer::ResponseWriter;
use crate::server::handler::{Handler, error};

/// Per-directory file whose contents replace the generated listing.
pub const GOPHERMAP: &str = "gophermap";

const CHUNK_SIZE: usize = 8192;

/// Serves a [`FileSystem`] tree.
///
/// Directories become menus (or the contents of their `gophermap`), files
/// are sent verbatim.
///
/// ```no_run
/// # use burrow::fs::{Dir, FileServer};
/// burrow::server::handle("/", FileServer::new(Dir::new("/tmp"))).unwrap();
/// ```
pub struct FileServer {
    root: Arc<dyn FileSystem>,
    detector: TypeDetector,
}

fn join(dir: &str, entry: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{entry}")
    } else {
        format!("{dir}/{entry}")
    }
}

impl FileServer {
    pub fn new<F>(root: F) -> Self
    where
        F: FileSystem + 'static,
    {
        Self {
            root: Arc::new(root),
            detector: TypeDetector::default(),
        }
    }

    pub fn with_detector(mut self, detector: TypeDetector) -> Self {
        self.detector = detector;
        self
    }

    /// `name` is a cleaned, `/`-separated path.
    async fn serve_file(&self, w: &mut ResponseWriter, req: &Request, name: &str) -> Result<()> {
        let mut file = match self.root.open(name).await {
            Ok(file) => file,
            Err(e) => return error(w, &e.to_string()),
        };

        let mut info = match file.stat().await {
            Ok(info) => info,
            Err(e) => return error(w, &e.to_string()),
        };

        if info.is_dir() {
            let map_name = join(name, GOPHERMAP);
            if let Ok(mut map) = self.root.open(&map_name).await {
                if let Ok(map_info) = map.stat().await {
                    tracing::debug!(dir = name, "Serving gophermap");
                    file = map;
                    info = map_info;
                }
            }
        }

        // still a directory when there is no gophermap
        if info.is_dir() {
            return self.list_dir(w, req, file.as_mut(), name).await;
        }

        serve_content(w, file.as_mut()).await
    }

    async fn list_dir(
        &self,
        w: &mut ResponseWriter,
        req: &Request,
        dir: &mut dyn File,
        name: &str,
    ) -> Result<()> {
        let mut entries = match dir.read_dir().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    root = %self.root.name(),
                    dir = name,
                    error = %e,
                    "Failed to read directory"
                );
                return error(w, "Error reading directory");
            }
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries.iter().filter(|e| !e.name.starts_with('.')) {
            let selector = join(name, &entry.name);

            let item_type = match entry.kind {
                FileKind::Directory => ItemType::Directory,
                FileKind::Regular => self.detector.classify(self.root.as_ref(), &selector).await,
                FileKind::Other => continue,
            };

            w.write_item(
                Item::new(item_type, entry.name.as_str(), selector)
                    .at(req.local_host.as_str(), req.local_port),
            )?;
        }

        Ok(())
    }
}

/// Streams a file from its beginning.
async fn serve_content(w: &mut ResponseWriter, content: &mut dyn File) -> Result<()> {
    content.seek(SeekFrom::Start(0)).await?;

    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = content.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        w.write(&chunk[..n])?;
        w.flush().await?;
    }

    Ok(())
}

#[async_trait]
impl Handler for FileServer {
    async fn serve_gopher(&self, w: &mut ResponseWriter, req: &Request) -> anyhow::Result<()> {
        let name = clean_path(&req.selector);
        self.serve_file(w, req, &name).await?;
        Ok(())
    }
}
