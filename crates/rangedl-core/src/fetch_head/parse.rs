//! Parse HTTP response header lines into a ResourceDescriptor.

use super::ResourceDescriptor;

/// Builds a descriptor from collected header lines.
///
/// Header names match case-insensitively; the `Accept-Ranges` value must be
/// exactly `bytes`. A new status line (e.g. after `100 Continue`) discards the
/// headers seen so far.
pub(crate) fn descriptor_from_headers(lines: &[String]) -> ResourceDescriptor {
    let mut content_length: Option<&str> = None;
    let mut accept_ranges: Option<&str> = None;

    for line in lines {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            content_length = None;
            accept_ranges = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = Some(value.trim());
            } else if name.eq_ignore_ascii_case("accept-ranges") {
                accept_ranges = Some(value.trim());
            }
        }
    }

    let total_size = content_length
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|n| *n > 0);

    match (total_size, accept_ranges) {
        (Some(total_size), Some("bytes")) => ResourceDescriptor {
            total_size,
            range_supported: true,
        },
        _ => ResourceDescriptor::UNUSABLE,
    }
}
