//! Part-file reassembly for merge mode.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const COPY_BUF: usize = 64 * 1024;

/// Failure while concatenating part files. The destination may be partially
/// written and earlier parts may already be gone; nothing is rolled back.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to create {}: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy part {} ({merged} parts already merged): {source}", path.display())]
    CopyPart {
        path: PathBuf,
        merged: usize,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove part {}: {source}", path.display())]
    RemovePart {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to flush {}: {source}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Concatenates `part_paths` in the given order into `destination` (created or
/// truncated), deleting each part as soon as its bytes are flushed.
/// Returns the number of bytes written.
pub fn merge_parts(part_paths: &[PathBuf], destination: &Path) -> Result<u64, MergeError> {
    let file = File::create(destination).map_err(|source| MergeError::CreateDestination {
        path: destination.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::with_capacity(COPY_BUF, file);
    let mut total = 0u64;

    for (merged, part) in part_paths.iter().enumerate() {
        let copy_err = |source| MergeError::CopyPart {
            path: part.clone(),
            merged,
            source,
        };
        let n = {
            let mut input = File::open(part).map_err(copy_err)?;
            let n = io::copy(&mut input, &mut out).map_err(copy_err)?;
            out.flush().map_err(copy_err)?;
            n
        };
        fs::remove_file(part).map_err(|source| MergeError::RemovePart {
            path: part.clone(),
            source,
        })?;
        tracing::debug!(part = %part.display(), bytes = n, "merged and removed part");
        total += n;
    }

    out.flush().map_err(|source| MergeError::Flush {
        path: destination.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        destination = %destination.display(),
        parts = part_paths.len(),
        bytes = total,
        "merge complete"
    );
    Ok(total)
}
