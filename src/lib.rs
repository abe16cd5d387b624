//! Parser for imageboard comment markup.
//!
//! Comments arrive from the API as a small, fixed dialect of HTML: `<em>`,
//! `<strong>`, a few `<span class="...">` variants, inline `style`
//! attributes, and `<a href>` links that quote other posts. [`PostParser`]
//! turns one such string into display text with style annotations, plus the
//! ordered list of posts it links to.
//!
//! ```
//! use boardmark::{PostParser, SiteConfig};
//!
//! let parser = PostParser::new(SiteConfig::new("2ch.hk").unwrap());
//! let result = parser.parse(r#"<a href="/b/res/1.html#2">&gt;&gt;2</a> agreed"#);
//! assert_eq!(result.text(), ">>2 agreed");
//! assert_eq!(result.replied_to(), ["2"]);
//! ```

#[macro_use]
pub mod macros;

pub mod api;
pub mod buffer;
pub mod links;
pub mod parser;
pub mod replies;
pub mod rules;
pub mod site;
pub mod strip;
pub mod style;

pub use api::{DecodeError, Post, Thread, decode_posts};
pub use buffer::{Annotation, Edit, RichBuffer};
pub use links::LinkRecord;
pub use parser::{ParseResult, PostParser};
pub use replies::{ParsedPost, ReplyGraph};
pub use site::SiteConfig;
pub use style::{Font, Foreground, RunStyle, StyleKind, TextRun};
