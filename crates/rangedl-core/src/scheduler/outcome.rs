//! Result and error types for a download attempt.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::TransferState;
use crate::downloader::{SegmentError, TransferResult};
use crate::fetch_head::{ProbeError, ResourceDescriptor};
use crate::segmenter::ByteRange;
use crate::storage::MergeError;

/// How a download attempt ended when no hard error occurred.
#[derive(Debug)]
pub enum TransferOutcome {
    /// Every segment succeeded and the destination is materialized.
    Complete {
        destination: PathBuf,
        bytes_written: u64,
        segments: Vec<TransferResult>,
    },
    /// At least one segment failed. Bytes of the other segments stay in their
    /// sinks; in merge mode the destination was not created.
    SegmentsFailed { segments: Vec<TransferResult> },
    /// The probe found no usable size or no range support; nothing was fetched.
    Refused { descriptor: ResourceDescriptor },
}

impl TransferOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, TransferOutcome::Complete { .. })
    }

    /// Terminal state this outcome corresponds to.
    pub fn state(&self) -> TransferState {
        if self.is_complete() {
            TransferState::Complete
        } else {
            TransferState::Failed
        }
    }

    /// Per-segment results, sorted by range index (empty when refused).
    pub fn segments(&self) -> &[TransferResult] {
        match self {
            TransferOutcome::Complete { segments, .. }
            | TransferOutcome::SegmentsFailed { segments } => segments,
            TransferOutcome::Refused { .. } => &[],
        }
    }

    /// Failed ranges with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&ByteRange, &SegmentError)> + '_ {
        self.segments()
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| (&r.range, e)))
    }
}

/// Hard failure that ended a download attempt.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("no byte ranges for {total_size} bytes with concurrency {concurrency}")]
    EmptyPartition { total_size: u64, concurrency: usize },
    #[error("storage error on {} while {phase:?}: {source}", path.display())]
    Storage {
        phase: TransferState,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl TransferError {
    /// Phase in which the attempt failed.
    pub fn phase(&self) -> TransferState {
        match self {
            TransferError::Probe(_) => TransferState::Probing,
            TransferError::EmptyPartition { .. } => TransferState::Partitioning,
            TransferError::Storage { phase, .. } => *phase,
            TransferError::Merge(_) => TransferState::Merging,
        }
    }
}
