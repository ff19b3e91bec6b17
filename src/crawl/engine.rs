// src/crawl/engine.rs
// =============================================================================
// The crawl engine.
//
// How it works:
// 1. Validate the seed URL and the depth limit
// 2. Spawn one task for the seed page at depth 0
// 3. Each page task:
//    a. stops right away if depth >= max_depth (the page is not even marked)
//    b. claims the URL in the VisitedSet, or stops if another task has it
//    c. parses the page into image sources and links
//    d. downloads the page's images and waits for them
//    e. spawns one child task per link at depth + 1
// 4. Wait until every task spawned at any level has finished
//
// All page tasks share one TaskTracker. The tracker is closed right after the
// seed task is spawned; children can still be spawned on a closed tracker, and
// `wait()` only resolves once the tracker is both closed and empty. A parent
// is alive while it spawns its children, so the tracker cannot drain early.
//
// Nothing limits how many page tasks run at once.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use url::Url;

use super::images::DownloadOrchestrator;
use super::report::{CrawlReport, CrawlStats};
use super::visited::VisitedSet;
use crate::error::CrawlError;
use crate::fetch::{Downloader, Parser};

// A page waiting to be visited
#[derive(Debug, Clone)]
struct CrawlTask {
    url: String,
    depth: usize, // link hops from the seed page
}

/// Settings that stay fixed for the lifetime of a Crawler.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Directory images are written into. Must already exist.
    pub destination: PathBuf,
    /// Sleep before every single image download
    pub delay: Duration,
}

pub struct Crawler {
    parser: Arc<dyn Parser>,
    downloader: Arc<dyn Downloader>,
    config: CrawlerConfig,
}

impl Crawler {
    pub fn new(parser: Arc<dyn Parser>, downloader: Arc<dyn Downloader>, config: CrawlerConfig) -> Self {
        Self { parser, downloader, config }
    }

    /// Crawls breadth-first from `start_url`, downloading every image on
    /// every page whose depth is below `max_depth`.
    ///
    /// Only invalid input is reported as an error. Pages that fail to parse
    /// and images that fail to download are logged and show up in the
    /// returned report, but the crawl itself still succeeds.
    ///
    /// With `max_depth = 0` not even the seed page is visited.
    pub async fn crawl(&self, start_url: &str, max_depth: i64) -> Result<CrawlReport, CrawlError> {
        Url::parse(start_url).map_err(|e| {
            CrawlError::invalid_input(format!("invalid start URL '{}': {}", start_url, e))
        })?;

        let max_depth = usize::try_from(max_depth).map_err(|_| {
            CrawlError::invalid_input(format!("max depth must be non-negative, got {}", max_depth))
        })?;

        info!(url = start_url, max_depth, "starting crawl");

        let stats = Arc::new(CrawlStats::default());
        let session = Arc::new(CrawlSession {
            parser: Arc::clone(&self.parser),
            images: DownloadOrchestrator::new(
                Arc::clone(&self.downloader),
                self.config.destination.clone(),
                self.config.delay,
                Arc::clone(&stats),
            ),
            visited: VisitedSet::new(),
            tracker: TaskTracker::new(),
            stats,
            max_depth,
        });

        session.schedule(CrawlTask { url: start_url.to_string(), depth: 0 });
        session.tracker.close();
        session.tracker.wait().await;

        let report = session.stats.snapshot(session.visited.len());
        info!(
            pages = report.pages_visited,
            failed_pages = report.pages_failed,
            images = report.images_saved,
            failed_images = report.images_failed,
            "crawl finished"
        );

        Ok(report)
    }
}

// Everything one crawl's tasks share. Created per `crawl` call and dropped
// when the last task finishes.
struct CrawlSession {
    parser: Arc<dyn Parser>,
    images: DownloadOrchestrator,
    visited: VisitedSet,
    tracker: TaskTracker,
    stats: Arc<CrawlStats>,
    max_depth: usize,
}

impl CrawlSession {
    fn schedule(self: &Arc<Self>, task: CrawlTask) {
        self.tracker.spawn(Arc::clone(self).visit_page(task));
    }

    // Boxed so the future type does not refer to itself through schedule()
    fn visit_page(self: Arc<Self>, task: CrawlTask) -> BoxFuture<'static, ()> {
        async move {
            if task.depth >= self.max_depth {
                debug!(url = %task.url, max_depth = self.max_depth, "reached max depth");
                return;
            }

            if self.visited.check_and_mark(&task.url) {
                debug!(url = %task.url, "already visited");
                return;
            }

            info!(url = %task.url, depth = task.depth, "processing page");

            let page = match self.parser.parse(&task.url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %task.url, error = %e, "failed to parse page");
                    self.stats.page_failed(&task.url, e.to_string());
                    return;
                }
            };
            self.stats.page_visited();

            if let Err(failures) = self.images.download_images(&page.image_sources, &task.url).await {
                warn!(
                    url = %task.url,
                    failed = failures.len(),
                    error = %failures,
                    "failed to download images"
                );
            }

            info!(
                url = %task.url,
                depth = task.depth,
                images = page.image_sources.len(),
                links = page.links.len(),
                "processed page"
            );

            for link in page.links {
                // The authoritative check happens in the child's check_and_mark
                if link.is_empty() || self.visited.contains(&link) {
                    continue;
                }

                self.schedule(CrawlTask { url: link, depth: task.depth + 1 });
            }
        }
        .boxed()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `self: Arc<Self>`?
//    - Each spawned task must own what it uses ('static)
//    - Cloning an Arc only bumps a reference count, so every task gets
//      its own handle to the same session
//
// 2. Why does visit_page return a BoxFuture instead of being `async fn`?
//    - visit_page spawns more visit_page futures
//    - An `async fn` that (indirectly) contains itself has no finite type
//    - Boxing gives the future a fixed, known size
//
// 3. What does TaskTracker do?
//    - Like a WaitGroup: it counts spawned tasks that are still running
//    - close() + wait() resolves once nothing is left running
//
// 4. Why usize::try_from(max_depth)?
//    - The caller may pass a negative i64
//    - try_from fails for negatives, which is exactly the validation we need
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{HtmlParser, HttpDownloader, PageResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // An in-memory website: url -> (images, links). Unknown URLs answer 404.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, PageResult>,
        parsed: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, images: &[&str], links: &[&str]) -> Self {
            self.pages.insert(
                url.to_string(),
                PageResult {
                    image_sources: images.iter().map(|s| s.to_string()).collect(),
                    links: links.iter().map(|s| s.to_string()).collect(),
                },
            );
            self
        }

        fn parsed(&self) -> Vec<String> {
            let mut parsed = self.parsed.lock().unwrap().clone();
            parsed.sort();
            parsed
        }
    }

    #[async_trait]
    impl Parser for FakeSite {
        async fn parse(&self, page_url: &str) -> Result<PageResult, FetchError> {
            self.parsed.lock().unwrap().push(page_url.to_string());
            self.pages.get(page_url).cloned().ok_or_else(|| FetchError::Status {
                url: page_url.to_string(),
                status: 404,
            })
        }
    }

    // Pretends to download; sources containing "broken" fail
    #[derive(Default)]
    struct FakeDownloader {
        downloaded: Mutex<Vec<String>>,
    }

    impl FakeDownloader {
        fn downloaded(&self) -> Vec<String> {
            let mut downloaded = self.downloaded.lock().unwrap().clone();
            downloaded.sort();
            downloaded
        }
    }

    #[async_trait]
    impl Downloader for FakeDownloader {
        async fn download(
            &self,
            source: &str,
            _base_url: &str,
            destination: &Path,
        ) -> Result<PathBuf, FetchError> {
            if source.contains("broken") {
                return Err(FetchError::Status { url: source.to_string(), status: 500 });
            }
            self.downloaded.lock().unwrap().push(source.to_string());
            Ok(destination.join(source))
        }
    }

    fn crawler(site: Arc<FakeSite>, downloader: Arc<FakeDownloader>) -> Crawler {
        Crawler::new(
            site,
            downloader,
            CrawlerConfig { destination: PathBuf::from("unused"), delay: Duration::ZERO },
        )
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let site = Arc::new(FakeSite::default());
        let downloader = Arc::new(FakeDownloader::default());

        let err = crawler(site.clone(), downloader).crawl("not-a-url", 1).await.unwrap_err();

        assert!(matches!(err, CrawlError::InvalidInput { .. }));
        assert!(site.parsed().is_empty());
    }

    #[tokio::test]
    async fn test_negative_depth() {
        let site = Arc::new(FakeSite::default().page("http://a.com/", &[], &[]));
        let downloader = Arc::new(FakeDownloader::default());

        let err = crawler(site.clone(), downloader).crawl("http://a.com/", -1).await.unwrap_err();

        assert!(matches!(err, CrawlError::InvalidInput { .. }));
        assert!(site.parsed().is_empty());
    }

    #[tokio::test]
    async fn test_depth_zero_visits_nothing() {
        let site = Arc::new(FakeSite::default().page("http://a.com/", &["logo.png"], &[]));
        let downloader = Arc::new(FakeDownloader::default());

        let report = crawler(site.clone(), downloader.clone())
            .crawl("http://a.com/", 0)
            .await
            .unwrap();

        assert!(site.parsed().is_empty());
        assert!(downloader.downloaded().is_empty());
        assert_eq!(report.pages_claimed, 0);
    }

    #[tokio::test]
    async fn test_depth_cutoff_on_chain() {
        let site = Arc::new(
            FakeSite::default()
                .page("http://a.com/a", &["a.png"], &["http://a.com/b"])
                .page("http://a.com/b", &["b.png"], &["http://a.com/c"])
                .page("http://a.com/c", &["c.png"], &["http://a.com/d"])
                .page("http://a.com/d", &["d.png"], &[]),
        );
        let downloader = Arc::new(FakeDownloader::default());

        let report = crawler(site.clone(), downloader.clone())
            .crawl("http://a.com/a", 2)
            .await
            .unwrap();

        assert_eq!(site.parsed(), vec!["http://a.com/a", "http://a.com/b"]);
        assert_eq!(downloader.downloaded(), vec!["a.png", "b.png"]);
        assert_eq!(report.pages_visited, 2);
        // c was scheduled but never claimed
        assert_eq!(report.pages_claimed, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_page_reached_twice_is_processed_once() {
        // a -> b, a -> c, b -> d, c -> d, d -> a
        let site = Arc::new(
            FakeSite::default()
                .page("http://a.com/a", &[], &["http://a.com/b", "http://a.com/c"])
                .page("http://a.com/b", &["b.png"], &["http://a.com/d"])
                .page("http://a.com/c", &["c.png"], &["http://a.com/d"])
                .page("http://a.com/d", &["d.png"], &["http://a.com/a"]),
        );
        let downloader = Arc::new(FakeDownloader::default());

        let report = crawler(site.clone(), downloader.clone())
            .crawl("http://a.com/a", 10)
            .await
            .unwrap();

        assert_eq!(
            site.parsed(),
            vec!["http://a.com/a", "http://a.com/b", "http://a.com/c", "http://a.com/d"]
        );
        assert_eq!(downloader.downloaded(), vec!["b.png", "c.png", "d.png"]);
        assert_eq!(report.pages_visited, 4);
        assert_eq!(report.images_saved, 3);
    }

    #[tokio::test]
    async fn test_parse_failure_only_stops_its_branch() {
        let site = Arc::new(
            FakeSite::default()
                .page("http://a.com/", &[], &["http://a.com/missing", "http://a.com/ok"])
                .page("http://a.com/ok", &["ok.png"], &[]),
        );
        let downloader = Arc::new(FakeDownloader::default());

        let report = crawler(site.clone(), downloader.clone())
            .crawl("http://a.com/", 3)
            .await
            .unwrap();

        assert_eq!(downloader.downloaded(), vec!["ok.png"]);
        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.failures[0].url, "http://a.com/missing");
    }

    #[tokio::test]
    async fn test_image_failures_do_not_stop_links() {
        let site = Arc::new(
            FakeSite::default()
                .page("http://a.com/", &["broken.png", "fine.png"], &["http://a.com/next"])
                .page("http://a.com/next", &["next.png"], &[]),
        );
        let downloader = Arc::new(FakeDownloader::default());

        let report = crawler(site.clone(), downloader.clone())
            .crawl("http://a.com/", 2)
            .await
            .unwrap();

        assert_eq!(site.parsed(), vec!["http://a.com/", "http://a.com/next"]);
        assert_eq!(downloader.downloaded(), vec!["fine.png", "next.png"]);
        assert_eq!(report.images_failed, 1);
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_empty_links_are_skipped() {
        let site = Arc::new(FakeSite::default().page("http://a.com/", &[], &["", ""]));
        let downloader = Arc::new(FakeDownloader::default());

        let report = crawler(site.clone(), downloader)
            .crawl("http://a.com/", 5)
            .await
            .unwrap();

        assert_eq!(site.parsed(), vec!["http://a.com/"]);
        assert_eq!(report.pages_failed, 0);
    }

    #[tokio::test]
    async fn test_crawl_real_site() {
        let server = MockServer::start().await;
        let page = |body: &str| {
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body.to_string())
        };

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(page(r#"<img src="img/cat.png"><a href="/about">About</a>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(page(r#"<img src="/img/dog.png"><a href="/">Home</a>"#))
            .mount(&server)
            .await;
        for name in ["cat.png", "dog.png"] {
            Mock::given(method("GET"))
                .and(path(format!("/img/{}", name)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
                .mount(&server)
                .await;
        }

        let dir = TempDir::new().expect("failed to create temp dir");
        let client = reqwest::Client::new();
        let crawler = Crawler::new(
            Arc::new(HtmlParser::new(client.clone())),
            Arc::new(HttpDownloader::new(client)),
            CrawlerConfig { destination: dir.path().to_path_buf(), delay: Duration::ZERO },
        );

        let report = crawler.crawl(&format!("{}/", server.uri()), 2).await.unwrap();

        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.images_saved, 2);
        assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"cat.png");
        assert_eq!(std::fs::read(dir.path().join("dog.png")).unwrap(), b"dog.png");
    }
}
