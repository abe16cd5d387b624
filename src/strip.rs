//! Final clean-up of a parsed comment: tag removal, entity decoding and
//! line-break normalisation.
//!
//! This is the only stage that changes the text's length. All tag and
//! style-sheet ranges are discovered first, merged, and deleted in one
//! left-to-right pass.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::{
    buffer::{Edit, RichBuffer},
    rules::Rule,
};

static GT_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)&gt;", "gt entity");
static LT_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)&lt;", "lt entity");
static QUOT_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)&quot;", "quot entity");
static NBSP_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)&nbsp;", "nbsp entity");
static AMP_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)&amp;", "amp entity");
static LINE_BREAKS_RE: LazyLock<Option<Regex>> = lazy_regex!(r"\n{3,}", "line breaks");

/// Entities decoded by [`decode_entities`], in decoding order.
///
/// `&nbsp;` becomes a line break: the site uses it to separate quoted lines.
/// `&amp;` comes last so a decoded `&` never starts another entity.
static ENTITIES: [(&LazyLock<Option<Regex>>, &str); 5] = [
    (&GT_RE, ">"),
    (&LT_RE, "<"),
    (&QUOT_RE, "\""),
    (&NBSP_RE, "\n"),
    (&AMP_RE, "&"),
];

/// Run every clean-up step in order.
pub fn normalize(buffer: &mut RichBuffer) {
    let removed = strip_tags(buffer);
    decode_entities(buffer);
    let collapsed = collapse_line_breaks(buffer);
    log::trace!("stripped {removed} tag ranges, collapsed {collapsed} line-break runs");
}

/// Delete every remaining tag and style-sheet block. Returns the number of
/// merged ranges removed.
pub fn strip_tags(buffer: &mut RichBuffer) -> usize {
    let text = buffer.as_str();
    let mut ranges = Rule::Tag.ranges(text);
    ranges.extend(Rule::StyleSheet.ranges(text));
    let edits = merge_ranges(ranges).into_iter().map(Edit::delete).collect();
    buffer.apply_edits(edits)
}

/// Sort `ranges` and fuse any that overlap, so they can be deleted in one
/// pass.
#[must_use]
pub fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start < last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Decode the handful of entities the site emits, one entity at a time.
pub fn decode_entities(buffer: &mut RichBuffer) {
    for &(re, replacement) in &ENTITIES {
        replace_all(buffer, re, replacement);
    }
}

/// Shrink every run of three or more line breaks to two, repeating until
/// none is left. Returns the number of runs replaced.
pub fn collapse_line_breaks(buffer: &mut RichBuffer) -> usize {
    let mut total = 0;
    loop {
        let replaced = replace_all(buffer, &LINE_BREAKS_RE, "\n\n");
        if replaced == 0 {
            return total;
        }
        total += replaced;
    }
}

fn replace_all(
    buffer: &mut RichBuffer,
    re: &LazyLock<Option<Regex>>,
    replacement: &'static str,
) -> usize {
    let Some(re) = re.as_ref() else {
        return 0;
    };
    let edits: Vec<Edit> = re
        .find_iter(buffer.as_str())
        .map(|m| Edit::replace(m.range(), replacement))
        .collect();
    if edits.is_empty() {
        return 0;
    }
    buffer.apply_edits(edits)
}
