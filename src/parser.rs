//! The comment parsing pipeline.
//!
//! Parsing runs in two phases. Discovery sweeps every rule over the raw
//! markup without touching it. Mutation then attaches styles and resolves
//! links (metadata only) and finally strips markup in a single pass, which
//! carries the style ranges along into the display text's coordinates.

use std::ops::Range;

use serde::Serialize;

use crate::{
    buffer::{Annotation, RichBuffer},
    links::{LinkRecord, resolve_anchor},
    rules::{Rule, RuleMatch},
    site::SiteConfig,
    strip,
    style::{StyleKind, TextRun, flatten_runs, intersections},
};

const SPAN_BOLD: &str = "font-weight: bold";
const SPAN_BACKGROUND: &str = "background-color:";

/// Parser for one site's comment markup.
///
/// Holds only configuration, so one instance can be shared freely across
/// threads.
#[derive(Debug, Clone)]
pub struct PostParser {
    site: SiteConfig,
}

/// Display text, its styles, and the posts it links to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    text: String,
    annotations: Vec<Annotation>,
    links: Vec<LinkRecord>,
    replied_to: Vec<String>,
}

/// Matches of every enabled rule against the untouched markup.
#[derive(Debug, Default)]
struct Discovery {
    span_styles: Vec<RuleMatch>,
    emphasis: Vec<Range<usize>>,
    strong: Vec<Range<usize>>,
    underline: Vec<Range<usize>>,
    spoilers: Vec<Range<usize>>,
    quotes: Vec<Range<usize>>,
    anchors: Vec<Range<usize>>,
}

impl Discovery {
    fn scan(text: &str) -> Self {
        let mut found = Self::default();
        for rule in Rule::ORDER.into_iter().filter(|rule| rule.is_enabled()) {
            match rule {
                Rule::SpanStyle => found.span_styles = rule.sweep(text),
                Rule::Emphasis => found.emphasis = rule.ranges(text),
                Rule::Strong => found.strong = rule.ranges(text),
                Rule::Underline => found.underline = rule.ranges(text),
                Rule::Spoiler => found.spoilers = rule.ranges(text),
                Rule::Quote => found.quotes = rule.ranges(text),
                Rule::Anchor => found.anchors = rule.ranges(text),
                // Swept by the stripper once styling is done.
                Rule::Tag | Rule::StyleSheet => {}
            }
        }
        found
    }
}

impl PostParser {
    #[must_use]
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Parse a raw `comment` or `subject` field.
    ///
    /// Never fails: malformed markup degrades to text with fewer styles and
    /// links.
    #[must_use]
    pub fn parse(&self, markup: &str) -> ParseResult {
        let mut buffer = RichBuffer::new(markup);
        let found = Discovery::scan(buffer.as_str());

        compose_styles(&mut buffer, &found);
        let links = self.resolve_links(&mut buffer, &found.anchors);
        strip::normalize(&mut buffer);

        log::trace!(
            "parsed {} bytes into {} bytes, {} styles, {} links",
            markup.len(),
            buffer.len(),
            buffer.annotations().len(),
            links.len()
        );
        ParseResult::new(buffer, links)
    }

    fn resolve_links(&self, buffer: &mut RichBuffer, anchors: &[Range<usize>]) -> Vec<LinkRecord> {
        let mut links = Vec::new();
        for range in anchors {
            let resolved = resolve_anchor(&buffer.as_str()[range.clone()], &self.site);
            if let Some(record) = resolved.record {
                links.push(record);
            }
            buffer.annotate(range.clone(), StyleKind::Link { url: resolved.url });
        }
        links
    }
}

/// Attach every style found during discovery. The combined emphasis+strong
/// style goes on after the individual ones so it wins where they overlap.
fn compose_styles(buffer: &mut RichBuffer, found: &Discovery) {
    for span in &found.span_styles {
        let attrs = span
            .capture
            .clone()
            .map_or("", |range| &buffer.as_str()[range]);
        let bold = attrs.contains(SPAN_BOLD);
        let background = attrs.contains(SPAN_BACKGROUND);
        if bold {
            buffer.annotate(span.range.clone(), StyleKind::Strong);
        }
        if background {
            buffer.annotate(span.range.clone(), StyleKind::Highlight);
        }
    }

    for range in &found.emphasis {
        buffer.annotate(range.clone(), StyleKind::Emphasis);
    }
    for range in &found.strong {
        buffer.annotate(range.clone(), StyleKind::Strong);
    }
    for range in intersections(&found.emphasis, &found.strong) {
        buffer.annotate(range, StyleKind::EmphasisStrong);
    }

    for range in &found.underline {
        buffer.annotate(range.clone(), StyleKind::Underline);
    }
    for range in &found.spoilers {
        buffer.annotate(range.clone(), StyleKind::Spoiler);
    }
    for range in &found.quotes {
        buffer.annotate(range.clone(), StyleKind::Quote);
    }
}

impl ParseResult {
    fn new(buffer: RichBuffer, links: Vec<LinkRecord>) -> Self {
        let (text, annotations) = buffer.into_parts();
        let replied_to = links.iter().filter_map(|link| link.post.clone()).collect();
        Self {
            text,
            annotations,
            links,
            replied_to,
        }
    }

    /// Text with all markup removed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Styles over [`text`](Self::text), in application order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Internal links in the order they appear.
    #[must_use]
    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    /// Post numbers this comment links to, in link order.
    #[must_use]
    pub fn replied_to(&self) -> &[String] {
        &self.replied_to
    }

    /// The text split into runs of uniform resolved style.
    #[must_use]
    pub fn runs(&self) -> Vec<TextRun> {
        flatten_runs(self.text.len(), &self.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Font;

    fn parser() -> PostParser {
        PostParser::new(SiteConfig::new("example.com").expect("valid host"))
    }

    fn styled<'a>(result: &'a ParseResult, style: &StyleKind) -> Vec<&'a str> {
        result
            .annotations()
            .iter()
            .filter(|a| &a.style == style)
            .map(|a| &result.text()[a.range.clone()])
            .collect()
    }

    #[test]
    fn combined_style_covers_inner_text() {
        let result = parser().parse("<em><strong>x</strong></em>");
        assert_eq!(result.text(), "x");
        assert_eq!(styled(&result, &StyleKind::EmphasisStrong), vec!["x"]);
        assert_eq!(result.runs()[0].style.font, Font::EmphasisStrong);
        assert_eq!(result.runs().len(), 1);
    }

    #[test]
    fn span_style_applies_bold_and_highlight() {
        let result = parser().parse(
            "<span style=\"font-weight: bold; background-color: #ff0\">loud</span> quiet",
        );
        assert_eq!(result.text(), "loud quiet");
        assert_eq!(styled(&result, &StyleKind::Strong), vec!["loud"]);
        assert_eq!(styled(&result, &StyleKind::Highlight), vec!["loud"]);
    }

    #[test]
    fn quotes_and_spoilers_are_styled() {
        let result = parser().parse(
            "<span class=\"unkfunc\">&gt;implying</span><br><span class=\"spoiler\">secret</span>",
        );
        assert_eq!(result.text(), ">implyingsecret");
        assert_eq!(styled(&result, &StyleKind::Quote), vec![">implying"]);
        assert_eq!(styled(&result, &StyleKind::Spoiler), vec!["secret"]);
    }

    #[test]
    fn reply_links_are_collected_in_order() {
        let result = parser().parse(
            "<a href=\"/b/res/1.html#2\" class=\"post-reply-link\">&gt;&gt;2</a><br>\
             <a href=\"/b/res/1.html#3\">&gt;&gt;3</a><br>\
             <a href=\"/b/res/1.html\">&gt;&gt;1</a>",
        );
        assert_eq!(result.text(), ">>2>>3>>1");
        assert_eq!(result.replied_to(), ["2", "3"]);
        assert_eq!(result.links().len(), 3);
    }

    #[test]
    fn anchor_without_href_is_plain_link() {
        let result = parser().parse("<a name=\"top\">top</a>");
        assert_eq!(styled(&result, &StyleKind::Link { url: None }), vec!["top"]);
        assert!(result.links().is_empty());
    }

    #[test]
    fn plain_text_passes_through() {
        let result = parser().parse("just words");
        assert_eq!(result.text(), "just words");
        assert!(result.annotations().is_empty());
        assert!(result.replied_to().is_empty());
    }
}
