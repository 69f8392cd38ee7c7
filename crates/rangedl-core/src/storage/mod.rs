//! Disk I/O and file lifecycle.
//!
//! Direct-write mode shares one preallocated destination file between all
//! segment workers, each writing its own region with positional writes
//! (pwrite). Merge mode gives every segment a `<destination>.partN` file and
//! concatenates them in index order once all segments are in.

mod builder;
mod merge;
mod writer;

pub use builder::StorageWriterBuilder;
pub use merge::{merge_parts, MergeError};
pub use writer::StorageWriter;

use std::path::{Path, PathBuf};

/// Part-file path for segment `index`: `file.iso` → `file.iso.part2`.
/// Lives in the destination's directory.
pub fn part_path(destination: &Path, index: usize) -> PathBuf {
    let mut o = destination.as_os_str().to_owned();
    o.push(format!(".part{}", index));
    PathBuf::from(o)
}
