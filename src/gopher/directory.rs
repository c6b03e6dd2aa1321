//! Gopher menus as an ordered list of items.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gopher::item::{END, Item};

/// A Gopher menu. Item order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub items: Vec<Item>,
}

/// Outcome of feeding one received line to a menu scan.
#[derive(Debug)]
pub(crate) enum MenuLine {
    Blank,
    End,
    Item(Item),
    Dropped,
}

/// Classifies one line of a menu body.
///
/// Lines that fail to parse are logged and reported as dropped so a single
/// bad line from a sloppy server does not sink the whole listing.
pub(crate) fn scan_line(raw: &str) -> MenuLine {
    let line = raw.trim_matches(|c| c == '\r' || c == '\n');

    if line.is_empty() {
        return MenuLine::Blank;
    }

    if line.as_bytes() == [END] {
        return MenuLine::End;
    }

    match Item::parse(line) {
        Ok(item) => MenuLine::Item(item),
        Err(e) => {
            tracing::warn!(line = ?line, error = %e, "Dropping malformed menu line");
            MenuLine::Dropped
        }
    }
}

impl Directory {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Parses a full menu body, stopping at the `.` terminator line.
    ///
    /// Blank lines are skipped and malformed lines dropped.
    pub fn from_text(text: &str) -> Self {
        let mut dir = Directory::default();

        for line in text.lines() {
            match scan_line(line) {
                MenuLine::End => break,
                MenuLine::Item(item) => dir.push(item),
                MenuLine::Blank | MenuLine::Dropped => {}
            }
        }

        dir
    }

    /// Concatenated menu lines. No terminator line is appended.
    pub fn to_text(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for item in &self.items {
            item.write_to(&mut buf);
        }
        buf
    }

    /// JSON form: `{"items":[{"type":"0",...}]}`.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl IntoIterator for Directory {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Item> for Directory {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
