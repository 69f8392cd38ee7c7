//! Range math and segment planning.
//!
//! Splits a resource of known size into contiguous, non-overlapping inclusive
//! byte ranges, one per concurrent segment.

mod range;

pub use range::{partition, ByteRange};
