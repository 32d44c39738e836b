//! Text buffer — the text the animator types into.
//!
//! A `Buffer` wraps a [`ropey::Rope`] with the handful of operations an
//! animation host needs: full-text snapshots, char offset ↔ `Position`
//! conversion, bounds-checked insert/delete, and saving back to disk.
//!
//! # Design choices
//!
//! - **Offsets are chars**, not bytes. `"café"` has 4 chars; offset 4 is the
//!   end of the text. Byte offsets never leak into the public API.
//!
//! - **Edits are all-or-nothing.** An edit whose endpoints fall outside the
//!   buffer is rejected with [`EditError`] and leaves the rope untouched.
//!
//! - **Saves are verbatim.** The rope is written exactly as it stands, so a
//!   buffer driven to match a file's text persists that text byte for byte,
//!   line breaks included.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ropey::Rope;
use thiserror::Error;

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an edit was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    /// The position does not address a char boundary inside the buffer.
    #[error("position {0} is outside the buffer")]
    OutOfBounds(Position),
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A text buffer backed by a rope, optionally tied to a file on disk.
pub struct Buffer {
    rope: Rope,
    path: Option<PathBuf>,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer with no file path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
        }
    }

    /// A buffer holding `text`, with no file path.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            path: None,
        }
    }

    /// Open the file at `path`.
    ///
    /// A missing file yields an empty buffer that will be created on the
    /// first save, the way an editor opens a new file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not
    /// valid UTF-8.
    pub fn open(path: &Path) -> io::Result<Self> {
        let rope = match fs::read_to_string(path) {
            Ok(text) => Rope::from_str(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Rope::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            rope,
            path: Some(path.to_path_buf()),
        })
    }

    // -- Text access --------------------------------------------------------

    /// Total char count.
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of lines. An empty buffer has one (empty) line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The full text as a `String`. Allocates.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Convert a char offset to a `Position`.
    ///
    /// Offsets past the end clamp to the end of the buffer.
    #[must_use]
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    /// Convert a `Position` to a char offset.
    ///
    /// Returns `None` if the line does not exist or the column runs past the
    /// line (including its line break). A column equal to the line's length
    /// is the position just after its last char.
    #[must_use]
    pub fn offset_at(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.rope.len_lines() {
            return None;
        }
        if pos.col > self.rope.line(pos.line).len_chars() {
            return None;
        }
        Some(self.rope.line_to_char(pos.line) + pos.col)
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfBounds`] if `pos` is not in the buffer; the
    /// buffer is left unchanged.
    pub fn insert(&mut self, pos: Position, text: &str) -> Result<(), EditError> {
        let idx = self.offset_at(pos).ok_or(EditError::OutOfBounds(pos))?;
        if !text.is_empty() {
            self.rope.insert(idx, text);
        }
        Ok(())
    }

    /// Delete the text in `range`. An empty range is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfBounds`] if either endpoint is not in the
    /// buffer; the buffer is left unchanged.
    pub fn delete(&mut self, range: Range) -> Result<(), EditError> {
        let start = self
            .offset_at(range.start)
            .ok_or(EditError::OutOfBounds(range.start))?;
        let end = self
            .offset_at(range.end)
            .ok_or(EditError::OutOfBounds(range.end))?;
        if start < end {
            self.rope.remove(start..end);
        }
        Ok(())
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // -- File I/O -----------------------------------------------------------

    /// Save to the buffer's file path.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set or the write fails.
    pub fn save(&mut self) -> io::Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"))?;
        self.save_as(&path)
    }

    /// Save to `path` and remember it as the buffer's file.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_as(&mut self, path: &Path) -> io::Result<()> {
        let mut file = io::BufWriter::new(fs::File::create(path)?);
        self.rope.write_to(&mut file)?;
        io::Write::flush(&mut file)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
