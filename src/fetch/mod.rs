// src/fetch/mod.rs
// =============================================================================
// Collaborators the crawler talks to the outside world through.
//
// Submodules:
// - parser: fetches a page and pulls out image sources and links
// - downloader: resolves an image reference, fetches it, saves it
// - file: copies a byte stream into a file
//
// The crawler only depends on the two traits below, so tests can swap in
// in-memory fakes while the binary uses the HTTP implementations.
// =============================================================================

mod downloader;
mod file;
mod parser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

pub use downloader::{resolve_reference, HttpDownloader};
pub use file::save_to_file;
pub use parser::HtmlParser;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// What a successfully parsed page contributes to the crawl.
// Both lists keep document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub image_sources: Vec<String>,
    pub links: Vec<String>,
}

/// Turns a page URL into its image sources and outgoing links.
#[async_trait]
pub trait Parser: Send + Sync {
    async fn parse(&self, page_url: &str) -> Result<PageResult, FetchError>;
}

/// Fetches one image reference and persists it under `destination`.
///
/// Returns the path the body was written to.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        source: &str,
        base_url: &str,
        destination: &Path,
    ) -> Result<PathBuf, FetchError>;
}

// Builds the HTTP client shared by the parser and the downloader.
// One client means one connection pool for the whole crawl.
//
// Only connecting is bounded. Once a server answers, a slow page or a large
// image is read to the end however long it takes.
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
