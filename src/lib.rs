// src/lib.rs
// =============================================================================
// image-fetcher: crawl a website breadth-first and download its images.
//
// Modules:
// - crawl: the depth-bounded, deduplicating crawl engine
// - fetch: HTML parser, HTTP downloader and file saver the engine uses
// - delay: parsing of the per-download delay ("10m", "1h30m", ...)
// - error: error types
//
// The binary in src/main.rs wires these together behind a small CLI.
// =============================================================================

pub mod crawl;
pub mod delay;
pub mod error;
pub mod fetch;

pub use crawl::{CrawlReport, Crawler, CrawlerConfig};
pub use error::{CrawlError, FetchError};
