// src/fetch/downloader.rs
// =============================================================================
// HTTP image downloader.
//
// Steps for one image:
// 1. Resolve the source against the page it was found on
// 2. GET the resolved URL
// 3. Stream the body into <destination>/<last path segment>
//
// Two images with the same last segment land on the same file; whichever
// finishes last wins.
// =============================================================================

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use tokio_util::io::StreamReader;
use tracing::debug;
use url::Url;

use super::parser::is_absolute_http;
use super::{save_to_file, Downloader};
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        source: &str,
        base_url: &str,
        destination: &Path,
    ) -> Result<PathBuf, FetchError> {
        let image_url = resolve_reference(source, base_url)?;
        let file_path = destination.join(file_name_for(&image_url)?);

        let response = self
            .client
            .get(&image_url)
            .send()
            .await
            .map_err(|e| FetchError::request(&image_url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: image_url,
                status: response.status().as_u16(),
            });
        }

        // Adapt the body stream to AsyncRead so the saver can stay generic
        let body = response.bytes_stream().map_err(io::Error::other);
        let reader = StreamReader::new(body);
        tokio::pin!(reader);

        let bytes = save_to_file(&mut reader, &file_path)
            .await
            .map_err(|source| FetchError::Io { path: file_path.clone(), source })?;

        debug!(url = %image_url, path = %file_path.display(), bytes, "saved image");
        Ok(file_path)
    }
}

/// Resolves an image reference against the page it was found on.
///
/// A reference that already starts with `http://` or `https://` is returned
/// unchanged; anything else is treated as relative to `base_url`.
pub fn resolve_reference(source: &str, base_url: &str) -> Result<String, FetchError> {
    if is_absolute_http(source) {
        return Ok(source.to_string());
    }

    let resolve_err = |source_err| FetchError::Resolve {
        reference: source.to_string(),
        base: base_url.to_string(),
        source: source_err,
    };

    let base = Url::parse(base_url).map_err(resolve_err)?;
    let resolved = base.join(source).map_err(resolve_err)?;
    Ok(resolved.to_string())
}

// The last non-empty path segment of the URL becomes the file name.
// Query strings and fragments are not part of it.
fn file_name_for(image_url: &str) -> Result<String, FetchError> {
    let no_name = || FetchError::NoFileName { url: image_url.to_string() };

    let parsed = Url::parse(image_url).map_err(|_| no_name())?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(str::to_string)
        .ok_or_else(no_name)
}
