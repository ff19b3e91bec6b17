// src/crawl/images.rs
// =============================================================================
// Downloads all images of one page.
//
// Every image source gets its own tokio task. Each task first sleeps the
// configured delay (the only politeness this crawler has), then hands the
// source to the Downloader. The page waits for all of its image tasks before
// moving on, and every failure is folded into one DownloadFailures value.
//
// These image tasks are joined right here. They are not part of the
// crawl-wide page tracker.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use super::report::CrawlStats;
use crate::error::{DownloadFailure, DownloadFailures, FetchError};
use crate::fetch::Downloader;

pub struct DownloadOrchestrator {
    downloader: Arc<dyn Downloader>,
    destination: PathBuf,
    delay: Duration,
    stats: Arc<CrawlStats>,
}

impl DownloadOrchestrator {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        destination: PathBuf,
        delay: Duration,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self { downloader, destination, delay, stats }
    }

    /// Downloads every source of one page, resolving relative ones against
    /// `base_url`.
    ///
    /// Returns how many images were saved, or every failure in source order
    /// if at least one download failed. Successful downloads are kept on disk
    /// either way.
    pub async fn download_images(
        &self,
        image_sources: &[String],
        base_url: &str,
    ) -> Result<usize, DownloadFailures> {
        if image_sources.is_empty() {
            return Ok(0);
        }

        let handles: Vec<_> = image_sources
            .iter()
            .map(|source| {
                let downloader = Arc::clone(&self.downloader);
                let destination = self.destination.clone();
                let delay = self.delay;
                let source = source.clone();
                let base_url = base_url.to_string();

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    downloader.download(&source, &base_url, &destination).await
                })
            })
            .collect();

        // join_all keeps the order of `handles`, i.e. of `image_sources`
        let results = join_all(handles).await;

        let mut saved = 0;
        let mut failures = Vec::new();

        for (source, joined) in image_sources.iter().zip(results) {
            let outcome = joined.map_err(FetchError::from).and_then(|result| result);

            match outcome {
                Ok(path) => {
                    debug!(source = %source, path = %path.display(), "image saved");
                    self.stats.image_saved();
                    saved += 1;
                }
                Err(error) => {
                    let failure = DownloadFailure { src_url: source.clone(), error };
                    self.stats.image_failed(source, failure.to_string());
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(saved)
        } else {
            Err(DownloadFailures { failures })
        }
    }
}
