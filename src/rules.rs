//! Tag recognition rules.
//!
//! Each [`Rule`] is an independent left-to-right sweep over the text that
//! yields non-overlapping matches, each covering a whole tag-delimited
//! expression including its delimiters. Rules do not see each other's
//! matches; overlaps are resolved by whoever consumes them.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

static SPAN_STYLE_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r"(?i)<span (.*?)>(.*?)</span>", "span style");
static EMPHASIS_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)<em[^>]*>(.*?)</em>", "emphasis");
static STRONG_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r"(?i)<strong[^>]*>(.*?)</strong>", "strong");
static UNDERLINE_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r#"(?i)<span class="u">(.*?)</span>"#, "underline");
static SPOILER_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r#"(?i)<span class="spoiler">(.*?)</span>"#, "spoiler");
static QUOTE_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r#"(?i)<span class="unkfunc">(.*?)</span>"#, "quote");
static ANCHOR_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r"(?i)<a[^>]*>(.*?[\s\S])</a>", "anchor");
static TAG_RE: LazyLock<Option<Regex>> = lazy_regex!(r"<[^>]*>", "tag");
static STYLE_SHEET_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r#"(?i)<style type="text/css">(.+?)</style>"#, "style sheet");

/// One recognisable construct of the comment markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `<span style="...">`; the capture holds the attribute text.
    SpanStyle,
    Emphasis,
    Strong,
    /// `<span class="u">`. Only part of the pipeline with the `underline`
    /// feature.
    Underline,
    Spoiler,
    Quote,
    Anchor,
    /// Any remaining tag, removed by the stripper.
    Tag,
    /// `<style type="text/css">` blocks, removed by the stripper.
    StyleSheet,
}

/// A single match of a [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Whole expression, delimiters included.
    pub range: Range<usize>,
    /// First capture group, if the rule has one and it participated.
    pub capture: Option<Range<usize>>,
}

impl Rule {
    /// Rules in the order the pipeline runs them.
    pub const ORDER: [Rule; 9] = [
        Rule::SpanStyle,
        Rule::Emphasis,
        Rule::Strong,
        Rule::Underline,
        Rule::Spoiler,
        Rule::Quote,
        Rule::Anchor,
        Rule::Tag,
        Rule::StyleSheet,
    ];

    /// Whether the pipeline runs this rule.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        match self {
            Rule::Underline => cfg!(feature = "underline"),
            _ => true,
        }
    }

    fn regex(self) -> Option<&'static Regex> {
        let re = match self {
            Rule::SpanStyle => &SPAN_STYLE_RE,
            Rule::Emphasis => &EMPHASIS_RE,
            Rule::Strong => &STRONG_RE,
            Rule::Underline => &UNDERLINE_RE,
            Rule::Spoiler => &SPOILER_RE,
            Rule::Quote => &QUOTE_RE,
            Rule::Anchor => &ANCHOR_RE,
            Rule::Tag => &TAG_RE,
            Rule::StyleSheet => &STYLE_SHEET_RE,
        };
        re.as_ref()
    }

    /// Every match of this rule in `text`, left to right.
    ///
    /// A rule whose pattern failed to compile yields no matches.
    #[must_use]
    pub fn sweep(self, text: &str) -> Vec<RuleMatch> {
        let Some(re) = self.regex() else {
            return Vec::new();
        };
        re.captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(RuleMatch {
                    range: whole.range(),
                    capture: caps.get(1).map(|m| m.range()),
                })
            })
            .collect()
    }

    /// Ranges of every match of this rule in `text`.
    #[must_use]
    pub fn ranges(self, text: &str) -> Vec<Range<usize>> {
        self.sweep(text).into_iter().map(|m| m.range).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn all_patterns_compile() {
        for rule in Rule::ORDER {
            assert!(rule.regex().is_some(), "{rule:?} failed to compile");
        }
    }

    #[rstest]
    #[case(Rule::Emphasis, "a <em>b</em> c <EM>d</EM>", vec![2..12, 15..25])]
    #[case(Rule::Strong, "<strong class=\"x\">b</strong>", vec![0..28])]
    #[case(Rule::Spoiler, "<span class=\"spoiler\">s</span>", vec![0..30])]
    #[case(Rule::Quote, "<span class=\"unkfunc\">&gt;q</span>", vec![0..34])]
    #[case(Rule::Anchor, "<a href=\"x\">t</a>", vec![0..17])]
    #[case(Rule::Tag, "a<br>b</p>", vec![1..5, 6..10])]
    #[case(Rule::StyleSheet, "<style type=\"text/css\">p{}</style>x", vec![0..34])]
    fn sweeps_expected_ranges(
        #[case] rule: Rule,
        #[case] text: &str,
        #[case] expected: Vec<Range<usize>>,
    ) {
        assert_eq!(rule.ranges(text), expected);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(Rule::Spoiler.sweep("plain text").is_empty());
    }

    #[test]
    fn empty_anchor_body_does_not_match() {
        assert!(Rule::Anchor.sweep("<a href=\"x\"></a>").is_empty());
    }

    #[test]
    fn span_style_captures_attributes() {
        let text = "<span style=\"font-weight: bold\">x</span>";
        let matches = Rule::SpanStyle.sweep(text);
        assert_eq!(matches.len(), 1);
        let capture = matches[0].capture.clone().expect("attribute capture");
        assert_eq!(&text[capture], "style=\"font-weight: bold\"");
    }

    #[test]
    fn underline_rule_is_off_by_default() {
        assert_eq!(Rule::Underline.is_enabled(), cfg!(feature = "underline"));
        assert!(Rule::Emphasis.is_enabled());
    }
}
