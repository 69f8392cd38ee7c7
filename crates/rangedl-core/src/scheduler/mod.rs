//! Transfer coordination: probe, partition, fetch all segments, reassemble.
//!
//! `download` drives one attempt through
//! `Probing → Partitioning → Fetching → (Merging) → Complete`, or `Failed`.

mod outcome;
mod run;
mod state;

pub use outcome::{TransferError, TransferOutcome};
pub use run::download;
pub use state::TransferState;
