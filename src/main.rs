// src/main.rs
// =============================================================================
// This is the entry point of the image-fetcher CLI.
//
// What happens here:
// 1. Parse command-line flags with clap
// 2. Set up logging (tracing + RUST_LOG / -v)
// 3. Parse the delay, create the destination directory
// 4. Build the HTTP parser/downloader pair and run the crawl
// 5. Exit 0 when the crawl completes, 1 on any flag or setup error
//    (clap would use 2 for bad flags; run() maps those to 1)
//
// Failures inside the crawl (a page that won't load, an image that 404s)
// do not change the exit code. They are logged, and listed with --json.
// =============================================================================

mod cli;

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser as _};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use image_fetcher::delay::parse_delay;
use image_fetcher::fetch::{build_client, HtmlParser, HttpDownloader};
use image_fetcher::{Crawler, CrawlerConfig};

#[tokio::main]
async fn main() {
    let exit_code = exit_code_for(run(std::env::args_os()).await);
    std::process::exit(exit_code);
}

// Ok carries the code for outcomes run() already reported itself
// (usage errors, --help); Err is a fatal setup or crawl error.
fn exit_code_for(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

// Returns:
//   Ok(0) = crawl completed (or --help / --version)
//   Ok(1) = missing or invalid flags
//   Err   = delay, directory, client or crawl input error
async fn run<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    // clap exits with 2 on bad flags by default; this tool uses 1
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(if e.use_stderr() { 1 } else { 0 });
        }
    };

    init_logging(cli.verbose);
    debug!(?cli, "CLI arguments parsed");

    if cli.depth < 0 {
        eprintln!("error: -e must be a non-negative integer, got {}\n", cli.depth);
        let _ = Cli::command().print_help();
        return Ok(1);
    }

    crawl(cli).await?;
    Ok(0)
}

// RUST_LOG wins; otherwise -v picks the level
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a second call (tests run several CLIs in one process) is a no-op
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn crawl(cli: Cli) -> Result<()> {
    let delay = parse_delay(&cli.delay).with_context(|| format!("Error parsing timeout '{}'", cli.delay))?;

    tokio::fs::create_dir_all(&cli.path)
        .await
        .with_context(|| format!("Error creating directory {}", cli.path.display()))?;

    let client = build_client().context("Error creating HTTP client")?;
    let crawler = Crawler::new(
        Arc::new(HtmlParser::new(client.clone())),
        Arc::new(HttpDownloader::new(client)),
        CrawlerConfig { destination: cli.path.clone(), delay },
    );

    let report = crawler
        .crawl(&cli.url, cli.depth)
        .await
        .context("Error during crawling")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    println!("Crawling and downloading completed.");
    Ok(())
}
