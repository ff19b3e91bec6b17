// src/fetch/file.rs
// =============================================================================
// Saves a byte stream to disk.
//
// The file is created (or truncated if it already exists) and the whole
// stream is copied into it. If the copy fails halfway, whatever was already
// written stays on disk.
// =============================================================================

use std::path::Path;

use tokio::fs::File;
use tokio::io::{self, AsyncRead, AsyncWriteExt};

// Returns the number of bytes written
pub async fn save_to_file<R>(reader: &mut R, path: &Path) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = File::create(path).await?;
    let written = io::copy(reader, &mut file).await?;
    file.flush().await?;
    Ok(written)
}
