// SPDX-License-Identifier: MIT
//
// Char-level diff and single-step selection.
//
// `diff_chars` splits the distance between the current text and the target
// into maximal runs: text both sides share, text only the target has
// (added), and text only the current side has (removed). Runs come out in
// document order and, where a region is replaced, the removed run comes
// before the added one.
//
// `next_step` is the heart of one heartbeat. It walks the runs keeping a
// cursor into the *current* text (unchanged runs advance it; nothing else
// needs to, because we stop at the first change) and turns the first change
// it meets into exactly one bounded edit. Offsets in a `Step` are only
// valid against the text the diff was computed from, which is why a tick
// never applies more than one.
//
// All offsets and lengths count chars, never bytes.

use similar::{ChangeTag, TextDiff};

/// How a run of text differs between current and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Present in both.
    Unchanged,
    /// Present in the target only.
    Added,
    /// Present in the current text only.
    Removed,
}

impl From<ChangeTag> for SegmentKind {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => Self::Unchanged,
            ChangeTag::Insert => Self::Added,
            ChangeTag::Delete => Self::Removed,
        }
    }
}

/// A maximal run of chars sharing one [`SegmentKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    /// Length of `text` in chars.
    pub chars: usize,
}

impl Segment {
    #[must_use]
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().count();
        Self { kind, text, chars }
    }
}

/// One bounded edit against the current text, in char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Insert `text` so that it starts at `offset`.
    Insert { offset: usize, text: String },
    /// Remove the chars in `[start, end)`.
    Delete { start: usize, end: usize },
}

/// Diff `current` against `target` char by char.
///
/// Adjacent single-char changes with the same tag are merged, so the result
/// alternates kinds except at a removed→added replacement.
#[must_use]
pub fn diff_chars(current: &str, target: &str) -> Vec<Segment> {
    let diff = TextDiff::from_chars(current, target);
    let mut segments: Vec<Segment> = Vec::new();

    for change in diff.iter_all_changes() {
        let kind = SegmentKind::from(change.tag());
        let value = change.value();
        match segments.last_mut() {
            Some(last) if last.kind == kind => {
                last.text.push_str(value);
                last.chars += value.chars().count();
            }
            _ => segments.push(Segment::new(kind, value)),
        }
    }

    segments
}

/// Pick the single edit a heartbeat should make.
///
/// The first added run yields an insertion of at most `budget` chars; the
/// first removed run yields a deletion of the whole run. Returns `None` when
/// every run is unchanged, i.e. the texts already match.
#[must_use]
pub fn next_step(segments: &[Segment], budget: usize) -> Option<Step> {
    let mut cursor = 0;
    for segment in segments {
        match segment.kind {
            SegmentKind::Unchanged => cursor += segment.chars,
            SegmentKind::Added => {
                return Some(Step::Insert {
                    offset: cursor,
                    text: segment.text.chars().take(budget).collect(),
                });
            }
            SegmentKind::Removed => {
                return Some(Step::Delete {
                    start: cursor,
                    end: cursor + segment.chars,
                });
            }
        }
    }
    None
}
