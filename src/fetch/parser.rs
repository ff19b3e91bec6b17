// src/fetch/parser.rs
// =============================================================================
// HTML page parser.
//
// Fetches a page over HTTP, then walks it with `scraper`:
// - every <img src="..."> becomes an image source
// - every <a href="..."> becomes a link
//
// Relative references are resolved against the page URL; absolute http(s)
// references are returned exactly as written.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{PageResult, Parser};
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HtmlParser {
    client: Client,
}

impl HtmlParser {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Parser for HtmlParser {
    async fn parse(&self, page_url: &str) -> Result<PageResult, FetchError> {
        let base = Url::parse(page_url).map_err(|source| FetchError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;

        let html = fetch_page(&self.client, page_url).await?;
        let page = extract_sources(&html, &base);

        debug!(
            url = page_url,
            images = page.image_sources.len(),
            links = page.links.len(),
            "parsed page"
        );

        Ok(page)
    }
}

// Fetches a web page and returns its HTML content
async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::request(url, e))?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().await.map_err(|e| FetchError::request(url, e))
}

// Extracts image sources and links from an HTML document, in document order.
//
// `Html` is not Send, so this stays a plain function and never lives across
// an .await.
fn extract_sources(html: &str, base: &Url) -> PageResult {
    let document = Html::parse_document(html);

    // "img[src], a[href]" selects both kinds in a single pass, which keeps the
    // relative order of images and links the same as in the markup.
    let selector = Selector::parse("img[src], a[href]").expect("static selector is valid");

    let mut page = PageResult::default();

    for element in document.select(&selector) {
        let value = element.value();
        match value.name() {
            "img" => {
                if let Some(src) = value.attr("src") {
                    page.image_sources.push(resolve_url(base, src));
                }
            }
            "a" => {
                if let Some(href) = value.attr("href") {
                    page.links.push(resolve_url(base, href));
                }
            }
            _ => {}
        }
    }

    page
}

// Absolute references pass through untouched; anything else is joined onto
// the page URL. A reference that cannot be joined is kept as written.
fn resolve_url(base: &Url, reference: &str) -> String {
    if is_absolute_http(reference) {
        return reference.to_string();
    }

    match base.join(reference) {
        Ok(url) => url.to_string(),
        Err(_) => reference.to_string(),
    }
}

pub(crate) fn is_absolute_http(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the page fetched in one function and parsed in another?
//    - scraper's Html type is not Send
//    - Futures that run on tokio's thread pool must be Send
//    - Keeping Html inside a plain (non-async) function means it is gone
//      before the next .await
//
// 2. base.join(href) vs Url::parse(href):
//    - join resolves relative references like a browser ("../about")
//    - Url::parse would also normalize absolute URLs (adding a trailing "/"),
//      which is why absolute references skip it entirely
// -----------------------------------------------------------------------------
