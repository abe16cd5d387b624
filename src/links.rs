//! Anchor resolution: href extraction, classification and the board/thread/
//! post path grammar of internal links.
//!
//! Internal links look like `/b/res/123.html#456`: board, a fixed `res`
//! segment, the thread page, and the post as fragment. Any of the three may
//! be missing, but a segment that is present must have the right shape or
//! the whole link is ignored.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::site::SiteConfig;

static HREF_DOUBLE_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r#"(?i)href="(.*?)""#, "double-quoted href");
static HREF_SINGLE_RE: LazyLock<Option<Regex>> =
    lazy_regex!(r"(?i)href='(.*?)'", "single-quoted href");
static AMP_RE: LazyLock<Option<Regex>> = lazy_regex!(r"(?i)&amp;", "ampersand entity");

const THREAD_SUFFIX: &str = ".html";

/// A reference to a post on the same site.
///
/// A missing board means the board the comment was posted on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRecord {
    pub board: Option<String>,
    pub thread: Option<String>,
    pub post: Option<String>,
}

/// Where an href points, once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A reference without its own host, resolved against the site root.
    Relative(Url),
    /// An absolute or protocol-relative URL on the site's host.
    Internal(Url),
    External(Url),
}

impl LinkTarget {
    /// The post reference this target encodes.
    ///
    /// A host-less reference with an empty path, such as `/`, still yields a
    /// record with every field empty; a hosted URL needs at least one
    /// component.
    #[must_use]
    pub fn record(&self) -> Option<LinkRecord> {
        match self {
            LinkTarget::Relative(url) => path_components(url),
            LinkTarget::Internal(url) => parse_internal(url),
            LinkTarget::External(_) => None,
        }
    }
}

/// Outcome of resolving one anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAnchor {
    /// The decoded href, if it was present and parseable.
    pub url: Option<String>,
    /// The reference it encodes, for internal links with a valid path.
    pub record: Option<LinkRecord>,
}

/// Resolve an anchor expression such as `<a href="...">text</a>`.
#[must_use]
pub fn resolve_anchor(anchor: &str, site: &SiteConfig) -> ResolvedAnchor {
    let Some(href) = extract_href(open_tag(anchor)) else {
        return ResolvedAnchor::default();
    };
    let href = decode_ampersands(href);
    let Some(target) = classify(&href, site) else {
        log::debug!("unparseable href {href:?}");
        return ResolvedAnchor::default();
    };
    let record = target.record();
    if record.is_none() {
        log::debug!("no post reference in {href:?}");
    }
    ResolvedAnchor {
        url: Some(href.into_owned()),
        record,
    }
}

/// The opening tag of an anchor expression, up to and including its `>`.
fn open_tag(anchor: &str) -> &str {
    anchor.find('>').map_or(anchor, |end| &anchor[..=end])
}

/// The href attribute value of an opening tag.
///
/// Double quotes are tried first, single quotes only when no double-quoted
/// attribute exists. An empty value counts as no href.
#[must_use]
pub fn extract_href(tag: &str) -> Option<&str> {
    [&HREF_DOUBLE_RE, &HREF_SINGLE_RE]
        .into_iter()
        .filter_map(|re| re.as_ref())
        .find_map(|re| re.captures(tag))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|href| !href.is_empty())
}

/// Decode `&amp;` so query strings survive URL parsing.
#[must_use]
pub fn decode_ampersands(href: &str) -> Cow<'_, str> {
    match AMP_RE.as_ref() {
        Some(re) => re.replace_all(href, "&"),
        None => Cow::Borrowed(href),
    }
}

/// Parse `href` and decide whether it stays on `site`.
///
/// Relative references resolve against the site root and are therefore
/// internal. Absolute and protocol-relative URLs are internal only when their
/// host matches the site's, ignoring a `www.` prefix. Host-less absolute URLs
/// such as `mailto:` are external.
#[must_use]
pub fn classify(href: &str, site: &SiteConfig) -> Option<LinkTarget> {
    let url = site.absolute_url(href)?;
    if is_relative_reference(href) {
        return Some(LinkTarget::Relative(url));
    }
    match url.host_str() {
        Some(host) if site.matches_host(host) => Some(LinkTarget::Internal(url)),
        _ => Some(LinkTarget::External(url)),
    }
}

/// `true` for hrefs with neither scheme nor authority, like `/b/` or `#1`.
fn is_relative_reference(href: &str) -> bool {
    matches!(Url::parse(href), Err(url::ParseError::RelativeUrlWithoutBase))
        && !href.starts_with("//")
}

/// Read the board/thread/post triple out of an internal URL.
///
/// Returns `None` when a present component has the wrong shape or when no
/// component is present at all.
#[must_use]
pub fn parse_internal(url: &Url) -> Option<LinkRecord> {
    path_components(url).filter(|record| *record != LinkRecord::default())
}

/// The board/thread/post triple of `url`, `None` if a present component is
/// malformed.
fn path_components(url: &Url) -> Option<LinkRecord> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let board = match segments.first() {
        Some(segment) if is_board(segment) => Some((*segment).to_string()),
        Some(_) => return None,
        None => None,
    };
    let thread = match segments.get(2) {
        Some(segment) => Some(thread_number(segment)?.to_string()),
        None => None,
    };
    let post = match url.fragment() {
        Some(fragment) if is_number(fragment) => Some(fragment.to_string()),
        Some(_) => return None,
        None => None,
    };

    Some(LinkRecord {
        board,
        thread,
        post,
    })
}

fn is_board(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn thread_number(segment: &str) -> Option<&str> {
    let split = segment.len().checked_sub(THREAD_SUFFIX.len())?;
    if !segment.is_char_boundary(split) || !segment[split..].eq_ignore_ascii_case(THREAD_SUFFIX) {
        return None;
    }
    let number = &segment[..split];
    is_number(number).then_some(number)
}
