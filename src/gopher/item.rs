use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Terminator line content of a directory response.
pub const END: u8 = b'.';

/// Field delimiter within a menu line.
pub const TAB: u8 = b'\t';

/// Line terminator.
pub const CRLF: &[u8] = b"\r\n";

/// Item type used when nothing better is known about a file.
pub const DEFAULT_TYPE: ItemType = ItemType::Binary;

/// Host placed on info and error lines that carry no network target.
pub const ERROR_HOST: &str = "error.host";

/// Port paired with [`ERROR_HOST`].
pub const ERROR_PORT: u16 = 1;

/// Host assumed when a menu line has no host field.
pub const NULL_HOST: &str = "null.host";

/// Well-known Gopher port.
pub const DEFAULT_PORT: u16 = 70;

/// Type tag of a Gopher menu entry.
///
/// The first character of each menu line. Types marked (*) in RFC 1436
/// require the client to read until the server closes the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// `0` plain text file
    File,
    /// `1` directory (menu)
    Directory,
    /// `2` CSO phone-book server
    Phonebook,
    /// `3` error
    Error,
    /// `4` BinHexed Macintosh file
    BinHex,
    /// `5` DOS binary archive (*)
    DosArchive,
    /// `6` UNIX uuencoded file
    Uuencoded,
    /// `7` index-search server
    IndexSearch,
    /// `8` text-based telnet session
    Telnet,
    /// `9` binary file (*)
    Binary,
    /// `+` redundant server
    Redundant,
    /// `T` text-based tn3270 session
    Tn3270,
    /// `g` GIF image
    Gif,
    /// `I` some kind of image
    Image,
    /// `i` informational message (non-standard)
    Info,
    /// `h` HTML document (non-standard)
    Html,
    /// `s` audio file (non-standard)
    Audio,
    /// `p` PNG image (non-standard)
    Png,
    /// `d` document (non-standard)
    Document,
}

impl ItemType {
    /// Every item type, in wire-tag order.
    pub const ALL: [ItemType; 19] = [
        ItemType::File,
        ItemType::Directory,
        ItemType::Phonebook,
        ItemType::Error,
        ItemType::BinHex,
        ItemType::DosArchive,
        ItemType::Uuencoded,
        ItemType::IndexSearch,
        ItemType::Telnet,
        ItemType::Binary,
        ItemType::Redundant,
        ItemType::Tn3270,
        ItemType::Gif,
        ItemType::Image,
        ItemType::Info,
        ItemType::Html,
        ItemType::Audio,
        ItemType::Png,
        ItemType::Document,
    ];

    /// Looks up the item type for a wire tag.
    ///
    /// # Example
    ///
    /// ```
    /// # use burrow::gopher::item::ItemType;
    /// assert_eq!(ItemType::from_char('1'), Some(ItemType::Directory));
    /// assert_eq!(ItemType::from_char('?'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        let t = match c {
            '0' => ItemType::File,
            '1' => ItemType::Directory,
            '2' => ItemType::Phonebook,
            '3' => ItemType::Error,
            '4' => ItemType::BinHex,
            '5' => ItemType::DosArchive,
            '6' => ItemType::Uuencoded,
            '7' => ItemType::IndexSearch,
            '8' => ItemType::Telnet,
            '9' => ItemType::Binary,
            '+' => ItemType::Redundant,
            'T' => ItemType::Tn3270,
            'g' => ItemType::Gif,
            'I' => ItemType::Image,
            'i' => ItemType::Info,
            'h' => ItemType::Html,
            's' => ItemType::Audio,
            'p' => ItemType::Png,
            'd' => ItemType::Document,
            _ => return None,
        };
        Some(t)
    }

    /// The wire tag.
    pub fn as_char(&self) -> char {
        match self {
            ItemType::File => '0',
            ItemType::Directory => '1',
            ItemType::Phonebook => '2',
            ItemType::Error => '3',
            ItemType::BinHex => '4',
            ItemType::DosArchive => '5',
            ItemType::Uuencoded => '6',
            ItemType::IndexSearch => '7',
            ItemType::Telnet => '8',
            ItemType::Binary => '9',
            ItemType::Redundant => '+',
            ItemType::Tn3270 => 'T',
            ItemType::Gif => 'g',
            ItemType::Image => 'I',
            ItemType::Info => 'i',
            ItemType::Html => 'h',
            ItemType::Audio => 's',
            ItemType::Png => 'p',
            ItemType::Document => 'd',
        }
    }

    /// Three-letter label for display in listings.
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::File => "TXT",
            ItemType::Directory => "DIR",
            ItemType::Phonebook => "PHO",
            ItemType::Error => "ERR",
            ItemType::BinHex => "HEX",
            ItemType::DosArchive => "ARC",
            ItemType::Uuencoded => "UUE",
            ItemType::IndexSearch => "QRY",
            ItemType::Telnet => "TEL",
            ItemType::Binary => "BIN",
            ItemType::Redundant => "DUP",
            ItemType::Tn3270 => "TN3",
            ItemType::Gif => "GIF",
            ItemType::Image => "IMG",
            ItemType::Info => "NFO",
            ItemType::Html => "HTM",
            ItemType::Audio => "SND",
            ItemType::Png => "PNG",
            ItemType::Document => "DOC",
        }
    }

    /// Whether fetching this type yields a menu rather than raw bytes.
    pub fn is_directory_like(&self) -> bool {
        matches!(self, ItemType::Directory | ItemType::IndexSearch)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ItemType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut buf = [0u8; 4];
        serializer.serialize_str(self.as_char().encode_utf8(&mut buf))
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TagVisitor;

        impl Visitor<'_> for TagVisitor {
            type Value = ItemType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-character gopher item type")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ItemType, E> {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => ItemType::from_char(c)
                        .ok_or_else(|| E::custom(format!("unknown item type {c:?}"))),
                    _ => Err(E::invalid_length(v.chars().count(), &self)),
                }
            }
        }

        deserializer.deserialize_str(TagVisitor)
    }
}

/// One line of a Gopher menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// The item type tag
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Display text
    pub description: String,
    /// Opaque string sent to `host` to fetch the item
    pub selector: String,
    /// Host serving the item
    pub host: String,
    /// Port on `host`
    pub port: u16,
    /// Non-standard trailing fields, ignored by compliant clients
    #[serde(default)]
    pub extras: Vec<String>,
}

impl Item {
    /// Creates an item with no host, port or extras.
    ///
    /// A response writer fills in its own host and port for such items.
    pub fn new(
        item_type: ItemType,
        description: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            item_type,
            description: description.into(),
            selector: selector.into(),
            host: String::new(),
            port: 0,
            extras: Vec::new(),
        }
    }

    /// Sets the host and port the item points at.
    pub fn at(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Appends a non-standard trailing field.
    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extras.push(extra.into());
        self
    }

    /// An informational line with no network target.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::new(ItemType::Info, msg, "").at(ERROR_HOST, ERROR_PORT)
    }

    /// An error line with no network target.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(ItemType::Error, msg, "").at(ERROR_HOST, ERROR_PORT)
    }

    /// Parses one menu line.
    ///
    /// Trailing and leading CR/LF are ignored. Missing fields take their
    /// defaults: empty selector, [`NULL_HOST`], port 0. A non-numeric port
    /// is tolerated (as 0) only on informational lines, since many servers
    /// put junk there.
    ///
    /// # Example
    ///
    /// ```
    /// # use burrow::gopher::item::{Item, ItemType};
    /// let item = Item::parse("0About\t/about.txt\texample.org\t70\r\n").unwrap();
    /// assert_eq!(item.item_type, ItemType::File);
    /// assert_eq!(item.selector, "/about.txt");
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_matches(|c| c == '\r' || c == '\n');
        let mut fields = line.split('\t');

        let head = fields.next().unwrap_or_default();
        let mut head_chars = head.chars();
        let tag = head_chars
            .next()
            .ok_or_else(|| Error::MalformedItem(line.to_string()))?;
        let item_type = ItemType::from_char(tag).ok_or(Error::UnknownItemType(tag))?;
        let description = head_chars.as_str().to_string();

        let selector = fields.next().unwrap_or_default().to_string();
        let host = fields.next().unwrap_or(NULL_HOST).to_string();

        let port = match fields.next() {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) => port,
                Err(_) if item_type == ItemType::Info => 0,
                Err(_) => return Err(Error::InvalidPort(raw.to_string())),
            },
            None => 0,
        };

        let extras = fields.map(str::to_string).collect();

        Ok(Self {
            item_type,
            description,
            selector,
            host,
            port,
            extras,
        })
    }

    /// Encodes the item as a CRLF-terminated menu line.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            self.description.len() + self.selector.len() + self.host.len() + 16,
        );
        self.write_to(&mut buf);
        buf
    }

    /// Appends the encoded menu line to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let mut tag = [0u8; 4];
        buf.extend_from_slice(self.item_type.as_char().encode_utf8(&mut tag).as_bytes());
        buf.extend_from_slice(self.description.as_bytes());
        buf.push(TAB);
        buf.extend_from_slice(self.selector.as_bytes());
        buf.push(TAB);
        buf.extend_from_slice(self.host.as_bytes());
        buf.push(TAB);
        buf.extend_from_slice(self.port.to_string().as_bytes());

        for extra in &self.extras {
            buf.push(TAB);
            buf.extend_from_slice(extra.as_bytes());
        }

        buf.extend_from_slice(CRLF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_line() {
        let item = Item::parse("1Docs").unwrap();

        assert_eq!(item.item_type, ItemType::Directory);
        assert_eq!(item.description, "Docs");
        assert_eq!(item.selector, "");
        assert_eq!(item.host, NULL_HOST);
        assert_eq!(item.port, 0);
        assert!(item.extras.is_empty());
    }

    #[test]
    fn every_tag_maps_back_to_itself() {
        for t in ItemType::ALL {
            assert_eq!(ItemType::from_char(t.as_char()), Some(t));
        }
    }
}
