// SPDX-License-Identifier: MIT
//
// n-animate — the typing animator behind n-replay.
//
// Given a live text buffer and a file whose contents the buffer should end
// up holding, the animator walks the buffer toward that text a few chars at
// a time: diff, pick one change, apply a bounded slice of it, wait for the
// next heartbeat, repeat. When a diff comes back with nothing left to do the
// buffer is saved and the animation ends.
//
// The animator never owns the buffer or touches the filesystem directly.
// Everything outside the diff-apply loop is a capability trait in `host`,
// so the same core drives an n-text `Buffer` from the CLI or an in-memory
// fake from the tests.

pub mod animator;
pub mod config;
pub mod diff;
pub mod driver;
pub mod error;
pub mod host;
pub mod timer;

pub use animator::{Animator, Status, Tick};
pub use config::{AnimatorConfig, ConfigError};
pub use driver::{Driver, StopHandle};
pub use error::LoadError;
pub use host::{Edit, ErrorReporter, FileReader, FileResolver, TextBuffer};
