//! Reply graph of a thread.
//!
//! Each parsed post knows which posts it quotes; inverting that gives, for
//! every post, the later posts answering it.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{api::Post, parser::ParseResult, parser::PostParser};

/// A post with its comment and subject parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPost {
    pub num: String,
    pub subject: ParseResult,
    pub comment: ParseResult,
}

/// Parsed posts of a thread plus who answered whom.
#[derive(Debug, Clone, Default)]
pub struct ReplyGraph {
    posts: Vec<ParsedPost>,
    answers: HashMap<String, Vec<String>>,
}

impl ReplyGraph {
    /// Parse every post and index the replies between them.
    ///
    /// Posts are parsed in parallel; order is preserved. A post quoting a
    /// number outside `posts` keeps it in its own
    /// [`replied_to`](ParseResult::replied_to) list but adds no answer.
    #[must_use]
    pub fn build(posts: &[Post], parser: &PostParser) -> Self {
        let parsed: Vec<ParsedPost> = posts
            .par_iter()
            .map(|post| ParsedPost {
                num: post.num.clone(),
                subject: parser.parse(&post.subject),
                comment: parser.parse(&post.comment),
            })
            .collect();

        let mut answers: HashMap<String, Vec<String>> = parsed
            .iter()
            .map(|post| (post.num.clone(), Vec::new()))
            .collect();
        for post in &parsed {
            for target in post.comment.replied_to() {
                if let Some(list) = answers.get_mut(target)
                    && !list.contains(&post.num)
                {
                    list.push(post.num.clone());
                }
            }
        }
        Self {
            posts: parsed,
            answers,
        }
    }

    /// Posts in thread order.
    #[must_use]
    pub fn posts(&self) -> &[ParsedPost] {
        &self.posts
    }

    #[must_use]
    pub fn post(&self, num: &str) -> Option<&ParsedPost> {
        self.posts.iter().find(|post| post.num == num)
    }

    /// Posts `num` quotes, in link order.
    #[must_use]
    pub fn replied_to(&self, num: &str) -> &[String] {
        self.post(num)
            .map(|post| post.comment.replied_to())
            .unwrap_or_default()
    }

    /// Posts quoting `num`, in thread order and without repeats.
    #[must_use]
    pub fn answers(&self, num: &str) -> &[String] {
        self.answers
            .get(num)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
