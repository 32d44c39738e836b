//! # n-text — Text buffer for n-replay
//!
//! The concrete buffer the animator edits:
//!
//! - **[`position`]** — `Position` (line, col) and `Range` types, 0-indexed
//! - **[`buffer`]** — `Buffer` wrapping a rope with offset/position conversion,
//!   bounds-checked edits, and verbatim saves

pub mod buffer;
pub mod position;

pub use buffer::{Buffer, EditError};
pub use position::{Position, Range};
