use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, bail};
use boardmark::{LinkRecord, ParseResult, PostParser, ReplyGraph, SiteConfig, TextRun, decode_posts};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Parser)]
#[command(version, about = "Render imageboard comment markup as display text")]
struct Cli {
    /// Host treated as this site when classifying links
    #[arg(long, default_value = "2ch.hk")]
    host: String,
    #[command(flatten)]
    opts: OutputOpts,
    /// Files holding comment markup, or API thread JSON with `--thread`
    files: Vec<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct OutputOpts {
    /// Board the input was posted on, used to resolve board-less links
    #[arg(long)]
    board: Option<String>,
    /// Print the parse result as JSON
    #[arg(long)]
    json: bool,
    /// Read API thread JSON and print every post with its replies
    #[arg(long)]
    thread: bool,
    /// Wrap display text
    #[arg(long)]
    wrap: bool,
    /// Column to wrap at
    #[arg(long, default_value_t = 80)]
    width: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    text: &'a str,
    runs: Vec<TextRun>,
    links: &'a [LinkRecord],
    targets: Vec<Option<String>>,
    replied_to: &'a [String],
}

#[derive(Serialize)]
struct ThreadEntry<'a> {
    num: &'a str,
    subject: &'a str,
    comment: Report<'a>,
    answers: &'a [String],
}

fn report<'a>(result: &'a ParseResult, site: &SiteConfig, opts: &OutputOpts) -> Report<'a> {
    Report {
        text: result.text(),
        runs: result.runs(),
        links: result.links(),
        targets: result
            .links()
            .iter()
            .map(|link| site.link_url(link, opts.board.as_deref()).map(String::from))
            .collect(),
        replied_to: result.replied_to(),
    }
}

fn display(text: &str, opts: &OutputOpts) -> String {
    let text = text.trim_end_matches('\n');
    if opts.wrap {
        textwrap::fill(text, opts.width)
    } else {
        text.to_string()
    }
}

fn render_comment(input: &str, parser: &PostParser, opts: &OutputOpts) -> anyhow::Result<String> {
    let result = parser.parse(input);
    if opts.json {
        return Ok(serde_json::to_string(&report(&result, parser.site(), opts))?);
    }
    Ok(display(result.text(), opts))
}

fn render_thread(input: &str, parser: &PostParser, opts: &OutputOpts) -> anyhow::Result<String> {
    let posts = decode_posts(input)?;
    let graph = ReplyGraph::build(&posts, parser);

    if opts.json {
        let entries: Vec<ThreadEntry<'_>> = graph
            .posts()
            .iter()
            .map(|post| ThreadEntry {
                num: &post.num,
                subject: post.subject.text(),
                comment: report(&post.comment, parser.site(), opts),
                answers: graph.answers(&post.num),
            })
            .collect();
        return Ok(serde_json::to_string(&entries)?);
    }

    let mut blocks = Vec::with_capacity(graph.posts().len());
    for post in graph.posts() {
        let mut block = format!("No.{}", post.num);
        if !post.subject.text().is_empty() {
            block.push(' ');
            block.push_str(post.subject.text());
        }
        let comment = display(post.comment.text(), opts);
        if !comment.is_empty() {
            block.push('\n');
            block.push_str(&comment);
        }
        let answers = graph.answers(&post.num);
        if !answers.is_empty() {
            let refs: Vec<String> = answers.iter().map(|num| format!(">>{num}")).collect();
            block.push_str("\nReplies: ");
            block.push_str(&refs.join(" "));
        }
        blocks.push(block);
    }
    Ok(blocks.join("\n\n"))
}

fn render(input: &str, parser: &PostParser, opts: &OutputOpts) -> anyhow::Result<String> {
    if opts.thread {
        render_thread(input, parser, opts)
    } else {
        render_comment(input, parser, opts)
    }
}

/// Entry point for the `boardmark` command-line tool.
///
/// Reads comment markup from the given files, or from standard input when no
/// file is named, and prints the display text. Files are parsed in parallel
/// and printed in argument order; a file that cannot be read or decoded is
/// reported on standard error and makes the process exit unsuccessfully once
/// the others are printed.
///
/// # Examples
///
/// ```sh
/// # Render a comment from standard input
/// echo '<strong>bold</strong> &gt;&gt;1' | boardmark
///
/// # Print a thread with its reply graph
/// boardmark --thread thread.json
/// ```
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let site = SiteConfig::new(&cli.host).with_context(|| format!("invalid host {:?}", cli.host))?;
    let parser = PostParser::new(site);

    if cli.files.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        println!("{}", render(&input, &parser, &cli.opts)?);
        return Ok(());
    }

    let outputs: Vec<anyhow::Result<String>> = cli
        .files
        .par_iter()
        .map(|path| {
            let input = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            render(&input, &parser, &cli.opts)
                .with_context(|| format!("failed to process {}", path.display()))
        })
        .collect();

    let mut failed = 0;
    for output in outputs {
        match output {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("boardmark: {err:#}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files could not be processed", cli.files.len());
    }
    Ok(())
}
