//! HTTP HEAD capability probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers only and decide
//! whether the resource can be split into byte ranges: it needs a positive
//! `Content-Length` and `Accept-Ranges: bytes`.

mod parse;

use std::str;
use thiserror::Error;

use crate::downloader::CurlOptions;

/// What the probe learned about a resource. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Advertised size in bytes, or -1 when unknown/unusable.
    pub total_size: i64,
    /// True if the server sent exactly `Accept-Ranges: bytes`.
    pub range_supported: bool,
}

impl ResourceDescriptor {
    /// Sentinel for a resource that cannot be downloaded in segments.
    pub const UNUSABLE: ResourceDescriptor = ResourceDescriptor {
        total_size: -1,
        range_supported: false,
    };

    /// True if the resource can be partitioned: ranges supported and size positive.
    pub fn is_usable(&self) -> bool {
        self.range_supported && self.total_size > 0
    }

    /// Size in bytes when the descriptor is usable.
    pub fn usable_size(&self) -> Option<u64> {
        if self.is_usable() {
            u64::try_from(self.total_size).ok()
        } else {
            None
        }
    }
}

/// Transport-level probe failure (DNS, connection refused, timeout, bad URL).
#[derive(Debug, Error)]
#[error("HEAD {url} failed: {source}")]
pub struct ProbeError {
    pub url: String,
    #[source]
    pub source: curl::Error,
}

/// Performs a HEAD request and returns the resource descriptor.
///
/// Header problems (no/zero/garbage `Content-Length`, missing `Accept-Ranges`)
/// and non-2xx statuses yield [`ResourceDescriptor::UNUSABLE`]; only transport
/// failures are errors. Blocks the current thread.
pub fn probe(url: &str, opts: &CurlOptions) -> Result<ResourceDescriptor, ProbeError> {
    let transport = |source| ProbeError {
        url: url.to_string(),
        source,
    };
    let mut lines: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.nobody(true).map_err(transport)?;
    opts.apply(&mut easy).map_err(transport)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(transport)?;
        transfer.perform().map_err(transport)?;
    }

    let code = easy.response_code().map_err(transport)?;
    drop(easy);

    if !(200..300).contains(&code) {
        tracing::warn!(url, code, "HEAD returned non-success status");
        return Ok(ResourceDescriptor::UNUSABLE);
    }

    let descriptor = parse::descriptor_from_headers(&lines);
    tracing::debug!(
        url,
        total_size = descriptor.total_size,
        range_supported = descriptor.range_supported,
        "probe complete"
    );
    Ok(descriptor)
}
