//! Editor-side collaborators: a view with selections, and a status line.
//!
//! Offsets are in chars, like the editor's own API.

use log::debug;

use crate::error::{ElnError, Result};

/// A selection; `a` is the anchor and `b` the caret, in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub a: usize,
    pub b: usize,
}

impl Region {
    pub const fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    pub const fn point(pos: usize) -> Self {
        Self { a: pos, b: pos }
    }

    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }

    pub fn end(&self) -> usize {
        self.a.max(self.b)
    }

    pub fn len(&self) -> usize {
        self.end() - self.begin()
    }

    pub fn is_empty(&self) -> bool {
        self.a == self.b
    }
}

/// What the host editor exposes to commands.
pub trait TextView {
    /// Buffer length in chars.
    fn size(&self) -> usize;

    fn selections(&self) -> Vec<Region>;

    fn substr(&self, region: Region) -> Result<String>;

    fn replace(&mut self, region: Region, text: &str) -> Result<()>;

    /// Insert `text` at `pos`, returning the number of chars inserted.
    fn insert(&mut self, pos: usize, text: &str) -> Result<usize>;
}

/// Human-readable one-line summaries for the user.
pub trait StatusSink {
    fn status_message(&mut self, msg: &str);
}

impl StatusSink for Vec<String> {
    fn status_message(&mut self, msg: &str) {
        self.push(msg.to_string());
    }
}

/// Where [`insert_text`] puts its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertAt {
    /// Start of the first selection
    #[default]
    Cursor,
    End,
    Offset(usize),
}

/// Insert `text` into `view`, returning the position used.
pub fn insert_text<V: TextView + ?Sized>(view: &mut V, text: &str, at: InsertAt) -> Result<usize> {
    let pos = match at {
        InsertAt::Cursor => view
            .selections()
            .first()
            .map(Region::begin)
            .unwrap_or_else(|| view.size()),
        InsertAt::End => view.size(),
        InsertAt::Offset(pos) => pos,
    };
    let inserted = view.insert(pos, text)?;
    debug!("Inserted {} chars at pos {}", inserted, pos);
    Ok(pos)
}

/// In-memory buffer with a selection list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selections: Vec<Region>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selections: Vec::new(),
        }
    }

    /// Buffer with the whole text selected.
    pub fn select_all(text: impl Into<String>) -> Self {
        let mut buffer = Self::from_string(text);
        let size = buffer.size();
        buffer.selections.push(Region::new(0, size));
        buffer
    }

    pub fn with_selections(mut self, selections: Vec<Region>) -> Self {
        self.selections = selections;
        self
    }

    pub fn set_selections(&mut self, selections: Vec<Region>) {
        self.selections = selections;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Byte offset of char offset `pos`, allowing one past the end.
    fn byte_offset(&self, pos: usize) -> Option<usize> {
        if pos == 0 {
            return Some(0);
        }
        self.text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.text.len()))
            .nth(pos)
    }

    fn byte_range(&self, region: Region) -> Result<std::ops::Range<usize>> {
        let invalid = || ElnError::InvalidRegion {
            begin: region.begin(),
            end: region.end(),
            size: self.size(),
        };
        let start = self.byte_offset(region.begin()).ok_or_else(invalid)?;
        let end = self.byte_offset(region.end()).ok_or_else(invalid)?;
        Ok(start..end)
    }
}

impl TextView for TextBuffer {
    fn size(&self) -> usize {
        self.text.chars().count()
    }

    fn selections(&self) -> Vec<Region> {
        self.selections.clone()
    }

    fn substr(&self, region: Region) -> Result<String> {
        let range = self.byte_range(region)?;
        Ok(self.text[range].to_string())
    }

    fn replace(&mut self, region: Region, text: &str) -> Result<()> {
        let range = self.byte_range(region)?;
        self.text.replace_range(range, text);
        Ok(())
    }

    fn insert(&mut self, pos: usize, text: &str) -> Result<usize> {
        let range = self.byte_range(Region::point(pos))?;
        self.text.insert_str(range.start, text);
        Ok(text.chars().count())
    }
}
