//! HTTP utilities for fetching dependency artifacts.

use crate::pipeline::error::{Error, Result};

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. Non-success status codes are
/// an error; the pipeline never retries a failed fetch.
pub async fn download(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let response = reqwest::get(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}
