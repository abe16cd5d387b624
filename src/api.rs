//! Typed schemas for the imageboard's post JSON.
//!
//! The API is loose about types: post numbers arrive as strings or numbers,
//! and flags as `0`/`1` or booleans. Both are accepted here, but a post
//! without `num` or `comment` is rejected with a [`DecodeError`] instead of
//! being silently skipped.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One post as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "string_or_number")]
    pub num: String,
    /// Number of the thread's opening post; `"0"` for the opening post itself.
    #[serde(default = "no_parent", deserialize_with = "string_or_number")]
    pub parent: String,
    pub comment: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "flag")]
    pub op: bool,
}

/// A thread: its posts in order, opening post first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub posts: Vec<Post>,
}

/// Failure to decode an API payload.
#[derive(Debug)]
pub enum DecodeError {
    /// The JSON was malformed or a post lacked a required field.
    Json(serde_json::Error),
    /// Valid JSON that is neither a post list nor a thread.
    UnexpectedShape,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Json(err) => write!(f, "invalid post payload: {err}"),
            DecodeError::UnexpectedShape => {
                f.write_str("expected a post array or an object with `posts` or `threads`")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(err) => Some(err),
            DecodeError::UnexpectedShape => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err)
    }
}

/// Decode the posts of a payload.
///
/// Accepts a bare array of posts, a thread object (`{"posts": [...]}`), or a
/// thread page (`{"threads": [{"posts": [...]}, ...]}`), whose threads are
/// concatenated.
///
/// # Errors
/// Returns [`DecodeError`] when the JSON is malformed, has another shape, or
/// any post lacks a required field.
pub fn decode_posts(json: &str) -> Result<Vec<Post>, DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => {
            if let Some(posts) = map.remove("posts") {
                return Ok(serde_json::from_value(posts)?);
            }
            if let Some(threads) = map.remove("threads") {
                let threads: Vec<Thread> = serde_json::from_value(threads)?;
                return Ok(threads.into_iter().flat_map(|t| t.posts).collect());
            }
            Err(DecodeError::UnexpectedShape)
        }
        _ => Err(DecodeError::UnexpectedShape),
    }
}

fn no_parent() -> String {
    "0".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}
