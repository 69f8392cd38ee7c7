//! Single-stream HTTP GET downloader (no Range).
//!
//! Writes the response body sequentially into the destination starting at offset 0.

use anyhow::{Context, Result};
use std::path::Path;

use super::CurlOptions;
use crate::storage::StorageWriterBuilder;

/// Downloads `url` with one plain GET into `destination` (created or truncated).
/// Returns the number of bytes written.
pub fn download_single(url: &str, destination: &Path, opts: &CurlOptions) -> Result<u64> {
    let storage = StorageWriterBuilder::create(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?
        .build();
    let mut offset = 0u64;
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    opts.apply(&mut easy)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match storage.write_at(offset, data) {
            Ok(()) => {
                offset += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_error {
        return Err(e).with_context(|| format!("failed to write {}", destination.display()));
    }
    perform_result.context("GET request failed")?;

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    tracing::debug!(url, bytes = offset, "single-stream download complete");
    Ok(offset)
}
