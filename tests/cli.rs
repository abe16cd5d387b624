//! Integration tests for the `boardmark` command-line interface.
//!
//! Covers standard input and file handling, JSON output, thread mode with
//! its reply graph, wrapping, and error reporting for unreadable inputs.

use std::fs;

use tempfile::tempdir;

mod prelude;
use prelude::*;

const THREAD: &str = include_str!("data/thread.json");

#[test]
fn test_cli_version_flag() {
    run_cli_with_args(&["--version"])
        .success()
        .stdout(format!("boardmark {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_renders_stdin() {
    run_cli_with_stdin(&[], "<strong>bold</strong> &gt;&gt;1<br>\n\n\n\nend\n")
        .success()
        .stdout("bold >>1\n\nend\n");
}

#[test]
fn test_cli_json_output() {
    run_cli_with_stdin(
        &["--host", "example.com", "--json"],
        r#"<a href="//example.com/b/res/123.html#456">&gt;&gt;456</a>"#,
    )
    .success()
    .stdout(
        predicate::str::contains(r#""text":">>456""#)
            .and(predicate::str::contains(r#""replied_to":["456"]"#))
            .and(predicate::str::contains(
                r#""targets":["https://example.com/b/res/123.html#456"]"#,
            ))
            .and(predicate::str::contains(r#""foreground":"link""#)),
    );
}

#[test]
fn test_cli_board_resolves_boardless_links() {
    run_cli_with_stdin(&["--json", "--board", "b"], r##"<a href="#7">&gt;&gt;7</a>"##)
        .success()
        .stdout(predicate::str::contains(
            r#""targets":["https://2ch.hk/b/#7"]"#,
        ));
}

#[test]
fn test_cli_thread_mode() {
    let output = run_cli_with_stdin(&["--thread"], THREAD).success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    insta::assert_snapshot!(stdout, @r"
    No.100 Topic
    first post
    Replies: >>101 >>102

    No.101
    >>100agreed
    Replies: >>102

    No.102
    >>100 >>101>agreed
    ");
}

#[test]
fn test_cli_thread_json() {
    run_cli_with_stdin(&["--thread", "--json"], THREAD)
        .success()
        .stdout(
            predicate::str::contains(r#""num":"100","subject":"Topic""#)
                .and(predicate::str::contains(r#""answers":["101","102"]"#)),
        );
}

#[test]
fn test_cli_thread_missing_field_fails() {
    run_cli_with_stdin(&["--thread"], r#"[{"num": 1}]"#)
        .failure()
        .stderr(predicate::str::contains("missing field `comment`"));
}

#[test]
fn test_cli_wrap_option() {
    run_cli_with_stdin(&["--wrap", "--width", "10"], "aaaa bbbb cccc")
        .success()
        .stdout("aaaa bbbb\ncccc\n");
}

#[test]
fn test_cli_invalid_host_fails() {
    run_cli_with_stdin(&["--host", ""], "text")
        .failure()
        .stderr(predicate::str::contains("invalid host"));
}

#[test]
fn test_cli_files_in_argument_order() {
    let dir = tempdir().expect("failed to create temporary directory");
    let mut args = Vec::new();
    let mut expected = String::new();
    for i in 0..4 {
        let path = dir.path().join(format!("post{i}.html"));
        fs::write(&path, format!("<em>post {i}</em>")).expect("failed to write post");
        expected.push_str(&format!("post {i}\n"));
        args.push(path);
    }
    let args: Vec<&str> = args
        .iter()
        .map(|p| p.to_str().expect("path is not valid UTF-8"))
        .collect();
    run_cli_with_args(&args).success().stdout(expected);
}

#[test]
fn test_cli_missing_file_reported() {
    let dir = tempdir().expect("failed to create temporary directory");
    let good = dir.path().join("good.html");
    fs::write(&good, "<strong>fine</strong>").expect("failed to write post");
    let missing = dir.path().join("missing.html");

    run_cli_with_args(&[
        good.to_str().expect("path is not valid UTF-8"),
        missing.to_str().expect("path is not valid UTF-8"),
    ])
    .failure()
    .stdout("fine\n")
    .stderr(predicate::str::contains("missing.html"));
}
