//! Segmented downloader engine.
//!
//! Runs one HTTP Range GET per byte range on a bounded pool of worker threads
//! pulling from a shared queue, and collects exactly one `TransferResult` per
//! range. Workers never talk to each other; their write targets are disjoint
//! by construction of the partition.

mod segment;
mod single;

pub use segment::fetch_segment;
pub use single::download_single;

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::segmenter::ByteRange;
use crate::storage::StorageWriter;

/// Transport options applied to every curl handle (probe, segments, single GET).
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    /// Receive buffer size; bounds how much of a segment is held in memory at once.
    pub buffer_size: Option<usize>,
    pub connect_timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            buffer_size: None,
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

impl CurlOptions {
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        if let Some(sz) = self.buffer_size {
            easy.buffer_size(sz)?;
        }
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        Ok(())
    }
}

/// Where a segment's bytes go. Owned by exactly one worker.
#[derive(Debug, Clone)]
pub enum SegmentSink {
    /// Positional writes into the shared destination, starting at `offset`.
    Offset { writer: StorageWriter, offset: u64 },
    /// Sequential writes into a dedicated part file (created or truncated).
    PartFile(PathBuf),
}

/// Why a segment failed.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Transfer ended without error but short of the range length.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Server sent more than the range (e.g. ignored `Range`); aborted before
    /// any byte landed outside the segment's region.
    #[error("server sent more than the requested {expected} bytes")]
    Overrun { expected: u64 },
    /// Disk write failed (disk full, permission denied, ...).
    #[error("storage: {0}")]
    Storage(#[source] io::Error),
    /// The worker running this segment died before reporting.
    #[error("segment worker exited without a result")]
    WorkerLost,
}

/// Outcome of one segment.
#[derive(Debug)]
pub struct TransferResult {
    pub range: ByteRange,
    /// Bytes delivered to the sink (including those of a failed segment).
    pub bytes_written: u64,
    /// `None` when the segment succeeded.
    pub error: Option<SegmentError>,
}

impl TransferResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetches every `(range, sink)` pair using at most `max_workers` threads and
/// waits for all of them. Results come back sorted by range index, one per
/// input pair, whether the segment succeeded or not.
pub fn run_segments(
    url: &str,
    work: Vec<(ByteRange, SegmentSink)>,
    max_workers: usize,
    opts: &CurlOptions,
) -> Vec<TransferResult> {
    let count = work.len();
    if count == 0 {
        return Vec::new();
    }
    let ranges: Vec<ByteRange> = work.iter().map(|(r, _)| *r).collect();

    let queue: Arc<Mutex<VecDeque<(ByteRange, SegmentSink)>>> =
        Arc::new(Mutex::new(work.into_iter().collect()));
    let (tx, rx) = mpsc::channel();
    let num_workers = max_workers.clamp(1, count);
    let mut handles = Vec::with_capacity(num_workers);

    for worker in 0..num_workers {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        let url = url.to_string();
        let opts = *opts;
        handles.push(thread::spawn(move || loop {
            let next = match queue.lock() {
                Ok(mut q) => q.pop_front(),
                Err(poisoned) => poisoned.into_inner().pop_front(),
            };
            let Some((range, sink)) = next else {
                break;
            };
            tracing::trace!(worker, index = range.index, "segment picked up");
            let result = segment::fetch_segment(&url, &range, &sink, &opts);
            if tx.send(result).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    // Ends once every worker has exited and dropped its sender.
    let mut results: Vec<TransferResult> = rx.iter().collect();
    for h in handles {
        if h.join().is_err() {
            tracing::error!("segment worker panicked");
        }
    }

    if results.len() < count {
        for range in ranges {
            if !results.iter().any(|r| r.range.index == range.index) {
                results.push(TransferResult {
                    range,
                    bytes_written: 0,
                    error: Some(SegmentError::WorkerLost),
                });
            }
        }
    }
    results.sort_by_key(|r| r.range.index);
    results
}
