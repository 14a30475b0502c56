use bytes::Bytes;
use reqwest::Client;

use crate::error::AppError;

/// Downloads an uploaded file through the shared HTTP client.
pub async fn load_file_from_url(client: &Client, url: &str, max_size: usize) -> Result<Bytes, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::HttpError(format!("Failed to fetch file: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::HttpError(
            format!("Failed to fetch file. Status: {}", response.status())
        ));
    }

    if response.content_length().map_or(false, |len| len as usize > max_size) {
        return Err(AppError::PayloadTooLarge(max_size));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::HttpError(format!("Failed to read response bytes: {}", e)))?;

    if bytes.len() > max_size {
        return Err(AppError::PayloadTooLarge(max_size));
    }
    Ok(bytes)
}
