// SPDX-License-Identifier: MIT
//
// Host capabilities — what the animator needs from the world around it.
//
// The animator is deliberately ignorant of where text lives and how files
// are found. It talks to four small traits:
//
//   TextBuffer    → read the live text, map offsets to positions, apply
//                   one edit, save
//   FileResolver  → turn a path pattern into matching files
//   FileReader    → read a file to a string
//   ErrorReporter → tell the user something went wrong
//
// Resolver and reader run on the background loader thread, so they must be
// `Send + Sync`. The buffer and reporter stay on the driving thread.
//
// The second half of this file provides the std-backed implementations the
// CLI uses: n-text's `Buffer`, a walkdir + globset resolver, a plain fs
// reader, and a reporter that logs and prints to stderr.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use n_text::{Buffer, EditError, Position, Range};
use walkdir::WalkDir;

use crate::error::LoadError;

// ─── Edits ──────────────────────────────────────────────────────────────────

/// A single edit in buffer coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert `text` at `at`.
    Insert { at: Position, text: String },
    /// Delete the text in the range.
    Delete(Range),
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { at, text } => write!(f, "insert {text:?} at {at}"),
            Self::Delete(range) => write!(f, "delete {range}"),
        }
    }
}

// ─── Capability traits ──────────────────────────────────────────────────────

/// The live text the animator edits.
pub trait TextBuffer {
    /// Why an edit was refused.
    type Error: fmt::Display;

    /// The full current text.
    fn text(&self) -> String;

    /// Convert a char offset into the text to a position.
    fn position_at(&self, offset: usize) -> Position;

    /// Apply one edit. Either the whole edit lands or the buffer is
    /// unchanged and an error comes back.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the host refuses the edit.
    fn apply(&mut self, edit: &Edit) -> Result<(), Self::Error>;

    /// Persist the current text to backing storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be written.
    fn save(&mut self) -> io::Result<()>;
}

/// Locates the file holding the target content.
pub trait FileResolver: Send + Sync {
    /// All files matching `pattern`, in a stable order. Only the first is
    /// ever read.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Resolve`] if the pattern is malformed.
    fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>, LoadError>;
}

/// Reads the target content.
pub trait FileReader: Send + Sync {
    /// The full text of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Surfaces a message to the user. Fire and forget.
pub trait ErrorReporter {
    fn report(&self, message: &str);
}

// ─── n-text Buffer ──────────────────────────────────────────────────────────

impl TextBuffer for Buffer {
    type Error = EditError;

    fn text(&self) -> String {
        self.contents()
    }

    fn position_at(&self, offset: usize) -> Position {
        Self::position_at(self, offset)
    }

    fn apply(&mut self, edit: &Edit) -> Result<(), EditError> {
        match edit {
            Edit::Insert { at, text } => self.insert(*at, text),
            Edit::Delete(range) => self.delete(*range),
        }
    }

    fn save(&mut self) -> io::Result<()> {
        Self::save(self)
    }
}

// ─── Filesystem resolver ────────────────────────────────────────────────────

/// Directory names the resolver never walks into.
pub const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// True for a directory below the walk root that should not be searched.
fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

/// Resolves glob patterns against a directory tree.
///
/// Patterns are matched against paths relative to `root`, with `/` as the
/// separator and `*` not crossing it (`**` does). A pattern that names an
/// existing file directly is returned as-is without walking the tree.
///
/// The walk never descends into hidden directories (`.git`, `.cache`) or
/// build output ([`SKIPPED_DIRS`]).
#[derive(Debug, Clone)]
pub struct GlobResolver {
    root: PathBuf,
}

impl GlobResolver {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileResolver for GlobResolver {
    fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
        let direct = self.root.join(pattern);
        if direct.is_file() {
            return Ok(vec![direct]);
        }

        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| LoadError::Resolve(e.kind().to_string()))?
            .compile_matcher();

        let mut matches = Vec::new();
        let walk = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded_dir(entry));
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if matcher.is_match(relative) {
                matches.push(entry.into_path());
            }
        }
        Ok(matches)
    }
}

// ─── Filesystem reader ──────────────────────────────────────────────────────

/// Reads files with `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

// ─── Reporter ───────────────────────────────────────────────────────────────

/// Logs the message and prints it to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, message: &str) {
        tracing::error!("{message}");
        eprintln!("n-replay: {message}");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
