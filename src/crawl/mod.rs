// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a URL, bounded by a depth limit
// - Every page is processed by exactly one task, however many pages link to it
// - Images of each page are downloaded concurrently, with a delay per image
// - Failures are logged and collected into a report, never returned
//
// Submodules:
// - engine: the Crawler and its per-page tasks
// - images: per-page image download fan-out
// - visited: the set of URLs already claimed
// - report: counters and failure records
// =============================================================================

mod engine;
mod images;
mod report;
mod visited;

pub use engine::{Crawler, CrawlerConfig};
pub use images::DownloadOrchestrator;
pub use report::{CrawlReport, CrawlStats, FailureKind, FailureRecord};
pub use visited::VisitedSet;
