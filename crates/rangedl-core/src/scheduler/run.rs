//! Drive one download attempt end to end.

use std::path::Path;

use super::{TransferError, TransferOutcome, TransferState};
use crate::config::{Strategy, TransferConfig};
use crate::downloader::{self, SegmentSink};
use crate::fetch_head;
use crate::segmenter::{self, ByteRange};
use crate::storage::{self, StorageWriter, StorageWriterBuilder};

/// Downloads `url` into `destination` with `cfg.concurrency` parallel Range GETs.
///
/// Returns `Refused` without issuing any GET when the probe reports an
/// unusable resource, and `SegmentsFailed` when any segment failed after all
/// workers have finished. Probe transport errors, destination setup errors and
/// merge errors are returned as `TransferError`. Blocks the current thread.
pub fn download(
    url: &str,
    destination: &Path,
    cfg: &TransferConfig,
) -> Result<TransferOutcome, TransferError> {
    let opts = cfg.curl_options();
    let mut state = TransferState::Probing;

    let descriptor = fetch_head::probe(url, &opts).map_err(|e| {
        state.advance(TransferState::Failed);
        e
    })?;
    let Some(total_size) = descriptor.usable_size() else {
        state.advance(TransferState::Failed);
        tracing::warn!(
            url,
            total_size = descriptor.total_size,
            range_supported = descriptor.range_supported,
            "resource is not range-capable; download not started"
        );
        return Ok(TransferOutcome::Refused { descriptor });
    };

    state.advance(TransferState::Partitioning);
    let ranges = segmenter::partition(total_size, cfg.concurrency);
    if ranges.is_empty() {
        state.advance(TransferState::Failed);
        return Err(TransferError::EmptyPartition {
            total_size,
            concurrency: cfg.concurrency,
        });
    }
    tracing::debug!(
        total_size,
        segments = ranges.len(),
        strategy = ?cfg.strategy,
        "partition planned"
    );

    let (work, shared) = match cfg.strategy {
        Strategy::Direct => {
            let writer = prepare_destination(destination, total_size).map_err(|source| {
                state.advance(TransferState::Failed);
                TransferError::Storage {
                    phase: TransferState::Partitioning,
                    path: destination.to_path_buf(),
                    source,
                }
            })?;
            (offset_sinks(&ranges, &writer), Some(writer))
        }
        Strategy::Merge => (part_sinks(&ranges, destination), None),
    };

    state.advance(TransferState::Fetching);
    let segments = downloader::run_segments(url, work, cfg.concurrency, &opts);

    let failed = segments.iter().filter(|r| !r.succeeded()).count();
    if failed > 0 {
        state.advance(TransferState::Failed);
        tracing::warn!(
            url,
            failed,
            total = segments.len(),
            "download incomplete: {} of {} segments failed",
            failed,
            segments.len()
        );
        return Ok(TransferOutcome::SegmentsFailed { segments });
    }

    let bytes_written: u64 = match shared {
        Some(writer) => {
            writer.sync().map_err(|source| {
                state.advance(TransferState::Failed);
                TransferError::Storage {
                    phase: TransferState::Fetching,
                    path: writer.path().to_path_buf(),
                    source,
                }
            })?;
            segments.iter().map(|r| r.bytes_written).sum()
        }
        None => {
            state.advance(TransferState::Merging);
            let parts: Vec<_> = ranges
                .iter()
                .map(|r| storage::part_path(destination, r.index))
                .collect();
            storage::merge_parts(&parts, destination).map_err(|e| {
                state.advance(TransferState::Failed);
                TransferError::from(e)
            })?
        }
    };

    state.advance(TransferState::Complete);
    tracing::info!(
        url,
        destination = %destination.display(),
        bytes = bytes_written,
        segments = segments.len(),
        "download complete"
    );
    Ok(TransferOutcome::Complete {
        destination: destination.to_path_buf(),
        bytes_written,
        segments,
    })
}

fn prepare_destination(destination: &Path, total_size: u64) -> std::io::Result<StorageWriter> {
    let mut builder = StorageWriterBuilder::create(destination)?;
    builder.preallocate(total_size)?;
    Ok(builder.build())
}

fn offset_sinks(ranges: &[ByteRange], writer: &StorageWriter) -> Vec<(ByteRange, SegmentSink)> {
    ranges
        .iter()
        .map(|r| {
            let sink = SegmentSink::Offset {
                writer: writer.clone(),
                offset: r.start,
            };
            (*r, sink)
        })
        .collect()
}

fn part_sinks(ranges: &[ByteRange], destination: &Path) -> Vec<(ByteRange, SegmentSink)> {
    ranges
        .iter()
        .map(|r| (*r, SegmentSink::PartFile(storage::part_path(destination, r.index))))
        .collect()
}
