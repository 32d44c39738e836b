// SPDX-License-Identifier: MIT
//
// Load errors — everything that can stop an animation before it begins.
//
// Ticks themselves never fail: a rejected edit or a failed save is logged
// and the animation carries on (or ends) without bothering the user. Only
// a target that cannot be loaded is worth an error message.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve or read the target content.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The pattern matched no files.
    #[error("no file matches the pattern")]
    NoMatch,

    /// The pattern could not be resolved (bad glob, unreadable directory).
    #[error("{0}")]
    Resolve(String),

    /// The first match could not be read.
    #[error("{}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The background loader thread could not be started.
    #[error("could not start loader: {0}")]
    Spawn(#[source] io::Error),

    /// The loader thread went away without sending a result.
    #[error("content loader exited without a result")]
    LoaderLost,
}

impl LoadError {
    /// The message shown to the user for a failed load of `pattern`.
    #[must_use]
    pub fn user_message(&self, pattern: &str) -> String {
        format!("Failed to read {pattern}: {self}")
    }
}
