// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Flags:
//   -f <URL>       seed URL (required)
//   -p <DIR>       where to save images (required, created if missing)
//   -e <DEPTH>     maximum link depth (required, must be >= 0)
//   -t <DURATION>  delay before each image download (default "10m")
//   --json         print the crawl report as JSON when done
//   -v             more logging (repeat for more)
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "image-fetcher",
    version,
    about = "Crawl a website breadth-first and download every image it links to",
    long_about = "image-fetcher starts at a URL, follows links up to a maximum depth and saves \
                  every <img> it finds into a local directory."
)]
pub struct Cli {
    /// URL to crawl
    #[arg(short = 'f', value_name = "URL")]
    pub url: String,

    /// Path to save images
    #[arg(short = 'p', value_name = "DIR")]
    pub path: PathBuf,

    /// Depth for internal links
    ///
    /// Depth 0 processes nothing, depth 1 only the starting page,
    /// depth 2 the starting page and every page it links to, etc.
    ///
    /// Negative numbers are accepted here so they can be reported with a
    /// usage message instead of a parse error.
    #[arg(short = 'e', value_name = "DEPTH", allow_negative_numbers = true)]
    pub depth: i64,

    /// Delay before every image download (e.g. 500ms, 2s, 10m, 1h30m)
    #[arg(short = 't', value_name = "DURATION", default_value = "10m")]
    pub delay: String,

    /// Print the crawl report as JSON when done
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}
