//! Item type detection for served files.
//!
//! Content sniffing comes first; the extension table is the fallback for
//! short files and content that does not sniff as anything useful.

use std::collections::HashMap;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::fs::filesystem::FileSystem;
use crate::gopher::item::{DEFAULT_TYPE, ItemType};

/// Bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 512;

const EXTENSIONS: &[(&str, ItemType)] = &[
    ("txt", ItemType::File),
    ("gif", ItemType::Gif),
    ("jpg", ItemType::Image),
    ("jpeg", ItemType::Image),
    ("png", ItemType::Image),
    ("html", ItemType::Html),
    ("ogg", ItemType::Audio),
    ("mp3", ItemType::Audio),
    ("wav", ItemType::Audio),
    ("mod", ItemType::Audio),
    ("it", ItemType::Audio),
    ("xm", ItemType::Audio),
    ("mid", ItemType::Audio),
    ("vgm", ItemType::Audio),
    ("s", ItemType::File),
    ("c", ItemType::File),
    ("py", ItemType::File),
    ("h", ItemType::File),
    ("md", ItemType::File),
    ("go", ItemType::File),
    ("fs", ItemType::File),
    ("rs", ItemType::File),
];

// Checked in order, so specific types go before their wildcard.
const MIME_TYPES: &[(&str, ItemType)] = &[
    ("text/html", ItemType::Html),
    ("text/*", ItemType::File),
    ("image/gif", ItemType::Gif),
    ("image/*", ItemType::Image),
    ("audio/*", ItemType::Audio),
    ("application/x-tar", ItemType::DosArchive),
    ("application/x-gtar", ItemType::DosArchive),
    ("application/x-xz", ItemType::DosArchive),
    ("application/zip", ItemType::DosArchive),
    ("application/x-zip", ItemType::DosArchive),
    ("application/x-gzip", ItemType::DosArchive),
    ("application/x-bzip2", ItemType::DosArchive),
];

const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"OggS\x00", "application/ogg"),
    (b"ID3", "audio/mpeg"),
    (b"MThd\x00\x00\x00\x06", "audio/midi"),
    (b"fLaC", "audio/flac"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"BZh", "application/x-bzip2"),
    (b"\xFD7zXZ\x00", "application/x-xz"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
];

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn is_markup_space(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// Guesses the MIME type of a file from its first bytes.
///
/// Returns `None` for content that looks like arbitrary binary data.
pub fn sniff(data: &[u8]) -> Option<&'static str> {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if data.starts_with(b"\xFE\xFF") {
        return Some("text/plain; charset=utf-16be");
    }
    if data.starts_with(b"\xFF\xFE") {
        return Some("text/plain; charset=utf-16le");
    }
    if data.starts_with(b"\xEF\xBB\xBF") {
        return Some("text/plain; charset=utf-8");
    }

    let start = data.iter().position(|&b| !is_markup_space(b)).unwrap_or(data.len());
    let markup = &data[start..];

    for tag in HTML_TAGS {
        if markup.len() > tag.len()
            && markup[..tag.len()].eq_ignore_ascii_case(tag)
            && matches!(markup[tag.len()], b' ' | b'>')
        {
            return Some("text/html; charset=utf-8");
        }
    }

    if markup.starts_with(b"<?xml") {
        return Some("text/xml; charset=utf-8");
    }

    for (magic, mime) in SIGNATURES {
        if data.starts_with(magic) {
            return Some(*mime);
        }
    }

    if data.len() >= 12 && data.starts_with(b"RIFF") {
        match &data[8..12] {
            b"WEBP" => return Some("image/webp"),
            b"WAVE" => return Some("audio/wave"),
            b"AVI " => return Some("video/avi"),
            _ => {}
        }
    }

    if data.len() >= 262 && &data[257..262] == b"ustar" {
        return Some("application/x-tar");
    }

    if !data.iter().copied().any(is_binary_byte) {
        return Some("text/plain; charset=utf-8");
    }

    None
}

/// Does `mime` match `pattern`, where the pattern may use a `*` subtype?
fn mime_matches(pattern: &str, mime: &str) -> bool {
    match pattern.strip_suffix("/*") {
        Some(major) => mime
            .split_once('/')
            .is_some_and(|(mime_major, _)| mime_major == major),
        None => pattern == mime,
    }
}

/// Maps files to item types.
#[derive(Debug, Clone)]
pub struct TypeDetector {
    extensions: HashMap<String, ItemType>,
    mime_types: Vec<(String, ItemType)>,
    default_type: ItemType,
}

impl Default for TypeDetector {
    fn default() -> Self {
        Self {
            extensions: EXTENSIONS
                .iter()
                .map(|(ext, t)| (ext.to_string(), *t))
                .collect(),
            mime_types: MIME_TYPES
                .iter()
                .map(|(pattern, t)| (pattern.to_string(), *t))
                .collect(),
            default_type: DEFAULT_TYPE,
        }
    }
}

impl TypeDetector {
    /// A detector with empty tables that always answers `default_type`.
    pub fn empty(default_type: ItemType) -> Self {
        Self {
            extensions: HashMap::new(),
            mime_types: Vec::new(),
            default_type,
        }
    }

    /// Maps a file extension (without the dot, any case) to `item_type`.
    pub fn with_extension(mut self, ext: &str, item_type: ItemType) -> Self {
        self.extensions.insert(ext.to_ascii_lowercase(), item_type);
        self
    }

    /// Adds a MIME pattern such as `video/*`, checked after existing ones.
    pub fn with_mime_type(mut self, pattern: &str, item_type: ItemType) -> Self {
        self.mime_types.push((pattern.to_string(), item_type));
        self
    }

    pub fn default_type(&self) -> ItemType {
        self.default_type
    }

    pub fn by_extension(&self, name: &str) -> Option<ItemType> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        self.extensions.get(&ext).copied()
    }

    /// Looks up a MIME type, ignoring any `; parameters`.
    pub fn by_mime_type(&self, mime: &str) -> Option<ItemType> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        self.mime_types
            .iter()
            .find(|(pattern, _)| mime_matches(pattern, essence))
            .map(|(_, t)| *t)
    }

    /// Classifies a regular file from its name and, when available, its
    /// first [`SNIFF_LEN`] bytes.
    pub fn classify_content(&self, name: &str, head: Option<&[u8]>) -> ItemType {
        head.and_then(sniff)
            .and_then(|mime| self.by_mime_type(mime))
            .or_else(|| self.by_extension(name))
            .unwrap_or(self.default_type)
    }

    /// Classifies the entry `name` of `fs`.
    pub async fn classify(&self, fs: &dyn FileSystem, name: &str) -> ItemType {
        let mut file = match fs.open(name).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(name, error = %e, "Cannot open file for type detection");
                return self.default_type;
            }
        };

        match file.stat().await {
            Ok(info) if info.is_dir() => return ItemType::Directory,
            Ok(_) => {}
            Err(_) => return self.classify_content(name, None),
        }

        let mut head = [0u8; SNIFF_LEN];
        match file.read_exact(&mut head).await {
            Ok(_) => self.classify_content(name, Some(&head[..])),
            Err(_) => self.classify_content(name, None),
        }
    }
}
