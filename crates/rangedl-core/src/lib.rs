//! rangedl core: fetch one HTTP resource as parallel byte-range segments.
//!
//! Pipeline: [`fetch_head::probe`] → [`segmenter::partition`] →
//! [`downloader::run_segments`] → [`storage::merge_parts`] (merge strategy only),
//! driven by [`scheduler::download`].

pub mod config;
pub mod logging;

pub mod downloader;
pub mod fetch_head;
pub mod scheduler;
pub mod segmenter;
pub mod storage;
pub mod url_model;

pub use config::{Strategy, TransferConfig};
pub use scheduler::{download, TransferError, TransferOutcome, TransferState};
