//! Utility helpers shared across integration tests.
#![allow(dead_code, reason = "not every test binary uses every helper")]

use assert_cmd::{Command, assert::Assert};
use boardmark::{ParseResult, PostParser, SiteConfig, StyleKind};

/// Parser for the `example.com` test site.
pub fn example_parser() -> PostParser {
    PostParser::new(SiteConfig::new("example.com").expect("valid test host"))
}

/// Slices of the display text carrying exactly `style`, in annotation order.
pub fn styled<'a>(result: &'a ParseResult, style: &StyleKind) -> Vec<&'a str> {
    result
        .annotations()
        .iter()
        .filter(|a| &a.style == style)
        .map(|a| &result.text()[a.range.clone()])
        .collect()
}

/// Run the binary with `args`, feeding `input` on standard input.
pub fn run_cli_with_stdin(args: &[&str], input: &str) -> Assert {
    Command::cargo_bin("boardmark")
        .expect("Failed to create cargo command for boardmark")
        .args(args)
        .write_stdin(input)
        .assert()
}

/// Run the binary with `args` and no standard input.
pub fn run_cli_with_args(args: &[&str]) -> Assert {
    Command::cargo_bin("boardmark")
        .expect("Failed to create cargo command for boardmark")
        .args(args)
        .assert()
}
