//! `rangedl probe <url>` – show what the server advertises.

use anyhow::{Context, Result};
use rangedl_core::downloader::CurlOptions;
use rangedl_core::fetch_head;

pub async fn run_probe(url: &str) -> Result<()> {
    let descriptor = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || fetch_head::probe(&url, &CurlOptions::default())
    })
    .await
    .context("probe task join")??;

    if descriptor.total_size > 0 {
        println!("Size:          {} bytes", descriptor.total_size);
    } else {
        println!("Size:          unknown");
    }
    println!(
        "Range support: {}",
        if descriptor.range_supported { "yes" } else { "no" }
    );
    println!(
        "Segmented:     {}",
        if descriptor.is_usable() {
            "supported"
        } else {
            "not supported (use --strategy simple)"
        }
    );
    Ok(())
}
