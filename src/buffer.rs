//! Mutable text buffer with ranged style annotations.
//!
//! Offsets are byte offsets into the UTF-8 text and always refer to the
//! buffer's *current* contents. Every edit re-expresses the stored
//! annotations in post-edit coordinates before returning, so a caller never
//! observes a stale range.

use std::ops::Range;

use serde::Serialize;

use crate::style::{StyleKind, TextRun, flatten_runs};

/// A style attached to a byte range of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub range: Range<usize>,
    pub style: StyleKind,
}

/// Replacement of a byte range with new text. An empty replacement is a
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: &'static str,
}

impl Edit {
    #[must_use]
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            replacement: "",
        }
    }

    #[must_use]
    pub fn replace(range: Range<usize>, replacement: &'static str) -> Self {
        Self { range, replacement }
    }
}

/// Working representation of one comment while it is being parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichBuffer {
    text: String,
    annotations: Vec<Annotation>,
}

impl RichBuffer {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Annotations in the order they were applied.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Attach `style` to `range`. Never changes the text.
    ///
    /// Empty ranges are ignored and ranges running past the end are clamped.
    pub fn annotate(&mut self, range: Range<usize>, style: StyleKind) {
        let end = range.end.min(self.text.len());
        if range.start >= end {
            return;
        }
        self.annotations.push(Annotation {
            range: range.start..end,
            style,
        });
    }

    /// Apply a batch of edits expressed in the buffer's current coordinates.
    ///
    /// Edits are sorted by start offset and applied left to right. A running
    /// shift (bytes inserted minus bytes removed so far) moves each later
    /// edit into post-edit coordinates before it is applied. Edits that
    /// overlap an earlier one or do not fall on character boundaries are
    /// skipped. Returns the number of edits applied.
    pub fn apply_edits(&mut self, mut edits: Vec<Edit>) -> usize {
        edits.sort_by_key(|edit| (edit.range.start, edit.range.end));
        let mut removed = 0;
        let mut inserted = 0;
        let mut last_end = 0;
        let mut applied = 0;
        for edit in edits {
            let Range { start, end } = edit.range;
            if start < last_end || start > end || end > self.text.len() + removed - inserted {
                log::debug!("skipping overlapping or out-of-range edit {start}..{end}");
                continue;
            }
            let at = start + inserted - removed;
            let until = end + inserted - removed;
            if !self.text.is_char_boundary(at) || !self.text.is_char_boundary(until) {
                log::debug!("skipping edit {start}..{end} off a character boundary");
                continue;
            }
            self.text.replace_range(at..until, edit.replacement);
            self.shift_annotations(at..until, edit.replacement.len());
            removed += end - start;
            inserted += edit.replacement.len();
            last_end = end;
            applied += 1;
        }
        self.annotations.retain(|a| !a.range.is_empty());
        applied
    }

    /// Move every annotation across a replacement of `replaced` with
    /// `inserted` bytes. Positions inside the replaced span collapse onto the
    /// replacement.
    fn shift_annotations(&mut self, replaced: Range<usize>, inserted: usize) {
        let Range { start: a, end: b } = replaced;
        let map = |pos: usize, inside: usize| {
            if pos <= a {
                pos
            } else if pos >= b {
                pos - (b - a) + inserted
            } else {
                inside
            }
        };
        for annotation in &mut self.annotations {
            let start = map(annotation.range.start, a);
            let end = map(annotation.range.end, a + inserted);
            annotation.range = start..end.max(start);
        }
    }

    /// Flatten the annotations into contiguous runs of resolved style.
    #[must_use]
    pub fn runs(&self) -> Vec<TextRun> {
        flatten_runs(self.text.len(), &self.annotations)
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Annotation>) {
        (self.text, self.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotate_clamps_and_ignores_empty() {
        let mut buf = RichBuffer::new("abc");
        buf.annotate(1..10, StyleKind::Quote);
        buf.annotate(2..2, StyleKind::Spoiler);
        assert_eq!(
            buf.annotations(),
            &[Annotation {
                range: 1..3,
                style: StyleKind::Quote
            }]
        );
    }

    #[test]
    fn deletions_shift_later_edits() {
        let mut buf = RichBuffer::new("<em>x</em> y");
        let applied = buf.apply_edits(vec![Edit::delete(5..10), Edit::delete(0..4)]);
        assert_eq!(applied, 2);
        assert_eq!(buf.as_str(), "x y");
    }

    #[test]
    fn annotations_follow_deletions() {
        let mut buf = RichBuffer::new("<em>x</em> y");
        buf.annotate(0..10, StyleKind::Emphasis);
        buf.annotate(11..12, StyleKind::Quote);
        buf.apply_edits(vec![Edit::delete(0..4), Edit::delete(5..10)]);
        assert_eq!(buf.annotations()[0].range, 0..1);
        assert_eq!(buf.annotations()[1].range, 2..3);
    }

    #[test]
    fn replacement_keeps_covering_annotation() {
        let mut buf = RichBuffer::new("a&gt;b");
        buf.annotate(0..6, StyleKind::Quote);
        buf.annotate(2..4, StyleKind::Spoiler);
        buf.apply_edits(vec![Edit::replace(1..5, ">")]);
        assert_eq!(buf.as_str(), "a>b");
        assert_eq!(buf.annotations()[0].range, 0..3);
        assert_eq!(buf.annotations()[1].range, 1..2);
    }

    #[test]
    fn annotations_inside_deleted_span_are_dropped() {
        let mut buf = RichBuffer::new("a<b>c");
        buf.annotate(1..4, StyleKind::Strong);
        buf.apply_edits(vec![Edit::delete(1..4)]);
        assert_eq!(buf.as_str(), "ac");
        assert!(buf.annotations().is_empty());
    }

    #[test]
    fn overlapping_edits_are_skipped() {
        let mut buf = RichBuffer::new("abcdef");
        let applied = buf.apply_edits(vec![Edit::delete(0..3), Edit::delete(2..4)]);
        assert_eq!(applied, 1);
        assert_eq!(buf.as_str(), "def");
    }
}
