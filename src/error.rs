// src/error.rs
// =============================================================================
// Error types shared by the crawler and its collaborators.
//
// - CrawlError: the only error a caller of Crawler::crawl can ever see
// - FetchError: what a parser or downloader returns for a single URL
// - DownloadFailure / DownloadFailures: per-page aggregate of image failures
//
// thiserror generates the Display and Error impls from the #[error] attributes.
// =============================================================================

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// Errors surfaced by Crawler::crawl.
//
// Anything that goes wrong after the inputs validate is logged and recorded in
// the CrawlReport instead of being returned here.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl CrawlError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }
}

/// Failure while fetching a page or an image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read...)
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered, but not with a 2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The page URL itself is not an absolute URL
    #[error("invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Could not resolve a reference against its base URL
    #[error("cannot resolve '{reference}' against '{base}': {source}")]
    Resolve {
        reference: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    /// The resolved URL has no final path segment to use as a file name
    #[error("no file name in URL {url}")]
    NoFileName { url: String },

    /// The download task panicked or was cancelled
    #[error("download task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn request(url: &str, source: reqwest::Error) -> Self {
        Self::Request { url: url.to_string(), source }
    }
}

// One image source that could not be downloaded.
//
// The field is called src_url because thiserror treats a field named
// `source` as the underlying error.
#[derive(Debug, Error)]
#[error("error downloading file {src_url}: {error}")]
pub struct DownloadFailure {
    pub src_url: String,
    pub error: FetchError,
}

/// Every failed image of one page, in the order the sources were given.
#[derive(Debug)]
pub struct DownloadFailures {
    pub failures: Vec<DownloadFailure>,
}

impl DownloadFailures {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for DownloadFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for DownloadFailures {}
