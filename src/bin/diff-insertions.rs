//! Print the inserted lines of a unified diff read from stdin, per file.

use std::io::{BufWriter, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use ai_codereview::constants;
use ai_codereview::diff::insertions::insertion_report;
use ai_codereview::diff::parser::parse_unified_diff;
use ai_codereview::diff::read_diff_stdin;
use ai_codereview::logging;

/// Read a unified diff on stdin and print only its added lines, grouped by file.
#[derive(Parser, Debug)]
#[command(name = "diff-insertions", version = constants::VERSION)]
struct Cli {}

#[tokio::main]
async fn main() {
    logging::init("warn");
    let _cli = Cli::parse();
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let input = read_diff_stdin().await.context("failed to read stdin")?;
    let files = parse_unified_diff(&input).context("failed to parse diff")?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in insertion_report(&files) {
        writeln!(out, "{line}").context("failed to write output")?;
    }
    out.flush().context("failed to write output")?;
    Ok(())
}
