//! `rangedl get <url>` – segmented (or single-stream) download.

use anyhow::{Context, Result};
use rangedl_core::config::{self, Strategy, TransferConfig};
use rangedl_core::downloader;
use rangedl_core::url_model;
use rangedl_core::TransferOutcome;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::StrategyArg;

/// Parsed arguments of `rangedl get`.
#[derive(Debug)]
pub struct GetRequest {
    pub url: String,
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub strategy: Option<StrategyArg>,
    pub config: Option<PathBuf>,
}

/// Config file (if any) overridden by explicit flags.
pub(crate) fn resolve_config(req: &GetRequest) -> Result<TransferConfig> {
    let mut cfg = match &req.config {
        Some(path) => config::load_from_path(path)?,
        None => TransferConfig::default(),
    };
    if let Some(n) = req.concurrency {
        cfg.concurrency = n;
    }
    match req.strategy {
        Some(StrategyArg::Direct) => cfg.strategy = Strategy::Direct,
        Some(StrategyArg::Merge) => cfg.strategy = Strategy::Merge,
        Some(StrategyArg::Simple) | None => {}
    }
    cfg.validate()?;
    Ok(cfg)
}

pub async fn run_get(req: GetRequest) -> Result<()> {
    let cfg = resolve_config(&req)?;
    let destination = req
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(url_model::derive_filename(&req.url)));
    let started = Instant::now();

    if req.strategy == Some(StrategyArg::Simple) {
        let bytes = tokio::task::spawn_blocking({
            let url = req.url.clone();
            let destination = destination.clone();
            let opts = cfg.curl_options();
            move || downloader::download_single(&url, &destination, &opts)
        })
        .await
        .context("download task join")??;
        println!(
            "Downloaded {} bytes to {} (single stream, {:.2}s)",
            bytes,
            destination.display(),
            started.elapsed().as_secs_f64()
        );
        return Ok(());
    }

    tracing::info!(
        url = %req.url,
        destination = %destination.display(),
        concurrency = cfg.concurrency,
        strategy = ?cfg.strategy,
        "starting download"
    );
    let outcome = tokio::task::spawn_blocking({
        let url = req.url.clone();
        let destination = destination.clone();
        move || rangedl_core::download(&url, &destination, &cfg)
    })
    .await
    .context("download task join")?
    .map_err(|e| {
        let phase = e.phase();
        anyhow::Error::new(e).context(format!("download failed while {:?}", phase))
    })?;

    match outcome {
        TransferOutcome::Complete {
            destination,
            bytes_written,
            segments,
        } => {
            println!(
                "Downloaded {} bytes to {} ({} segments, {:.2}s)",
                bytes_written,
                destination.display(),
                segments.len(),
                started.elapsed().as_secs_f64()
            );
            Ok(())
        }
        TransferOutcome::Refused { descriptor } => anyhow::bail!(
            "download not started: server must send a positive Content-Length and \
             Accept-Ranges: bytes (size {}, ranges {}); try --strategy simple",
            descriptor.total_size,
            if descriptor.range_supported { "yes" } else { "no" }
        ),
        outcome @ TransferOutcome::SegmentsFailed { .. } => {
            anyhow::bail!("{}", describe_failures(&outcome))
        }
    }
}

/// One line per failed range, suitable for the error exit.
pub(crate) fn describe_failures(outcome: &TransferOutcome) -> String {
    let failed: Vec<_> = outcome.failures().collect();
    let mut msg = format!(
        "{} of {} segments failed while fetching:",
        failed.len(),
        outcome.segments().len()
    );
    for (range, err) in failed {
        let _ = write!(
            msg,
            "\n  segment {} ({}): {}",
            range.index,
            range.range_header_value(),
            err
        );
    }
    msg
}
