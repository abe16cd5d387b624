//! Site configuration used to tell internal links from external ones.
//!
//! The parser never consults global state: the host it treats as "this
//! imageboard" is carried by a [`SiteConfig`] handed to
//! [`PostParser::new`](crate::PostParser::new).

use url::Url;

use crate::links::LinkRecord;

const WWW_PREFIX: &str = "www.";

/// Host and scheme of the imageboard whose comments are being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    host: String,
    base: Url,
}

impl SiteConfig {
    /// Build a configuration for `host` served over https.
    ///
    /// # Errors
    /// Returns an error if `host` cannot form a valid base URL.
    pub fn new(host: &str) -> Result<Self, url::ParseError> {
        Self::with_scheme("https", host)
    }

    /// Build a configuration for `host` served over `scheme`.
    ///
    /// # Errors
    /// Returns an error if `scheme` and `host` do not form a valid base URL.
    pub fn with_scheme(scheme: &str, host: &str) -> Result<Self, url::ParseError> {
        let host = host.trim().trim_end_matches('/');
        let base = Url::parse(&format!("{scheme}://{host}/"))?;
        let host = base
            .host_str()
            .ok_or(url::ParseError::EmptyHost)?
            .to_string();
        Ok(Self { host, base })
    }

    /// The configured host, normalized the way parsed URLs report theirs.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured host without a leading `www.`.
    #[must_use]
    pub fn bare_host(&self) -> &str {
        strip_www(&self.host)
    }

    /// Root URL of the site, e.g. `https://2ch.hk/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Returns `true` when `host` names this site.
    ///
    /// A single leading `www.` is ignored on either side; everything else
    /// must match exactly.
    #[must_use]
    pub fn matches_host(&self, host: &str) -> bool {
        strip_www(host) == self.bare_host()
    }

    /// Resolve `href` against the site root.
    ///
    /// Absolute URLs are returned as parsed; relative and protocol-relative
    /// references are joined onto [`base_url`](Self::base_url).
    #[must_use]
    pub fn absolute_url(&self, href: &str) -> Option<Url> {
        match Url::parse(href) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base.join(href).ok(),
            Err(_) => None,
        }
    }

    /// Canonical page URL of a thread.
    #[must_use]
    pub fn thread_url(&self, board: &str, thread: &str) -> Option<Url> {
        self.base.join(&format!("/{board}/res/{thread}.html")).ok()
    }

    /// Canonical URL a [`LinkRecord`] points at.
    ///
    /// `current_board` fills in a missing board. Records without a thread
    /// resolve to the board index, with the post as fragment if present.
    #[must_use]
    pub fn link_url(&self, link: &LinkRecord, current_board: Option<&str>) -> Option<Url> {
        let board = link.board.as_deref().or(current_board)?;
        let mut url = match link.thread.as_deref() {
            Some(thread) => self.thread_url(board, thread)?,
            None => self.base.join(&format!("/{board}/")).ok()?,
        };
        url.set_fragment(link.post.as_deref());
        Some(url)
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix(WWW_PREFIX).unwrap_or(host)
}
