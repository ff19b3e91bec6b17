// src/crawl/report.rs
// =============================================================================
// What happened during one crawl.
//
// Page and image failures never turn into an error returned by the crawler;
// they are logged where they happen and also counted here so the caller can
// inspect them afterwards (the CLI prints this as JSON with --json).
//
// CrawlStats is the shared, mutable side written by the tasks.
// CrawlReport is the plain snapshot handed back once the crawl is done.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The page could not be fetched or parsed
    Parse,
    /// One image of a page could not be downloaded
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Pages claimed by a task (includes pages that later failed to parse)
    pub pages_claimed: usize,
    /// Pages parsed successfully
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failures: Vec<FailureRecord>,
}

impl CrawlReport {
    pub fn has_failures(&self) -> bool {
        self.pages_failed > 0 || self.images_failed > 0
    }
}

#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_visited: AtomicUsize,
    pages_failed: AtomicUsize,
    images_saved: AtomicUsize,
    images_failed: AtomicUsize,
    failures: Mutex<Vec<FailureRecord>>,
}

impl CrawlStats {
    pub fn page_visited(&self) {
        self.pages_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_failed(&self, url: &str, message: String) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
        self.push_failure(url, FailureKind::Parse, message);
    }

    pub fn image_saved(&self) {
        self.images_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn image_failed(&self, src_url: &str, message: String) {
        self.images_failed.fetch_add(1, Ordering::Relaxed);
        self.push_failure(src_url, FailureKind::Download, message);
    }

    fn push_failure(&self, url: &str, kind: FailureKind, message: String) {
        // A poisoned lock only means another task panicked mid-push
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.push(FailureRecord { url: url.to_string(), kind, message });
    }

    pub fn snapshot(&self, pages_claimed: usize) -> CrawlReport {
        let failures = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        CrawlReport {
            pages_claimed,
            pages_visited: self.pages_visited.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            images_saved: self.images_saved.load(Ordering::Relaxed),
            images_failed: self.images_failed.load(Ordering::Relaxed),
            failures,
        }
    }
}
