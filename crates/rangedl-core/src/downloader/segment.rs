//! Single-segment HTTP Range GET into a sink.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::str;

use super::{CurlOptions, SegmentError, SegmentSink, TransferResult};
use crate::segmenter::ByteRange;
use crate::storage::StorageWriter;

/// Open write target for one segment. Dropping it releases the file handle.
enum SinkWriter<'a> {
    Offset {
        writer: &'a StorageWriter,
        offset: u64,
    },
    PartFile(BufWriter<File>),
}

impl<'a> SinkWriter<'a> {
    fn open(sink: &'a SegmentSink) -> io::Result<Self> {
        match sink {
            SegmentSink::Offset { writer, offset } => Ok(SinkWriter::Offset {
                writer,
                offset: *offset,
            }),
            SegmentSink::PartFile(path) => Ok(SinkWriter::PartFile(BufWriter::new(File::create(path)?))),
        }
    }

    /// Writes `data`, which starts `pos` bytes into the segment.
    fn write_chunk(&mut self, pos: u64, data: &[u8]) -> io::Result<()> {
        match self {
            SinkWriter::Offset { writer, offset } => writer.write_at(*offset + pos, data),
            SinkWriter::PartFile(f) => f.write_all(data),
        }
    }

    fn finish(self) -> io::Result<()> {
        match self {
            SinkWriter::Offset { .. } => Ok(()),
            SinkWriter::PartFile(mut f) => f.flush(),
        }
    }
}

/// Downloads `range` of `url` into `sink`. Never panics on I/O failure and
/// never retries: any transport error, non-2xx status, short body, overlong
/// body or disk error is recorded in the returned result.
pub fn fetch_segment(
    url: &str,
    range: &ByteRange,
    sink: &SegmentSink,
    opts: &CurlOptions,
) -> TransferResult {
    let mut bytes_written = 0u64;
    let error = match SinkWriter::open(sink) {
        Ok(mut writer) => {
            let res = transfer_range(url, range, &mut writer, &mut bytes_written, opts);
            let flushed = writer.finish().map_err(SegmentError::Storage);
            res.and(flushed).err()
        }
        Err(e) => Some(SegmentError::Storage(e)),
    };

    match &error {
        None => tracing::debug!(
            index = range.index,
            range = %range.range_header_value(),
            bytes = bytes_written,
            "segment complete"
        ),
        Some(e) => tracing::warn!(
            index = range.index,
            range = %range.range_header_value(),
            bytes = bytes_written,
            "segment failed: {}",
            e
        ),
    }

    TransferResult {
        range: *range,
        bytes_written,
        error,
    }
}

fn transfer_range(
    url: &str,
    range: &ByteRange,
    writer: &mut SinkWriter<'_>,
    written: &mut u64,
    opts: &CurlOptions,
) -> Result<(), SegmentError> {
    let expected = range.len();
    let status = Cell::new(0u32);
    let mut storage_error: Option<io::Error> = None;
    let mut overrun = false;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    opts.apply(&mut easy)?;
    easy.range(&range.curl_range())?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            // Error bodies never reach the sink.
            if !(200..300).contains(&status.get()) {
                return Ok(0);
            }
            if *written + data.len() as u64 > expected {
                overrun = true;
                return Ok(0);
            }
            match writer.write_chunk(*written, data) {
                Ok(()) => {
                    *written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0)
                }
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(io_err) = storage_error.take() {
                return Err(SegmentError::Storage(io_err));
            }
            if overrun {
                return Err(SegmentError::Overrun { expected });
            }
            return Err(SegmentError::Http(status.get()));
        }
        return Err(SegmentError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(SegmentError::Http(code));
    }

    if *written != expected {
        return Err(SegmentError::PartialTransfer {
            expected,
            received: *written,
        });
    }
    Ok(())
}

/// Status code from a line like `HTTP/1.1 206 Partial Content`.
fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
