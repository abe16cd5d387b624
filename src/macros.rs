//! Helper macros used across the crate.

/// Lazily compile a [`Regex`] that degrades to `None` when the pattern is
/// invalid.
///
/// A rule whose pattern fails to compile simply never matches; the failure is
/// reported once through [`log::error!`] under the given name.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use regex::Regex;
/// static RE: LazyLock<Option<Regex>> = boardmark::lazy_regex!(r"\d+", "digits");
/// assert!(RE.as_ref().is_some_and(|re| re.is_match("42")));
/// ```
#[macro_export]
macro_rules! lazy_regex {
    ($pattern:expr, $name:expr $(,)?) => {
        LazyLock::new(|| match Regex::new($pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                ::log::error!("failed to compile {} regex: {err}", $name);
                None
            }
        })
    };
}
