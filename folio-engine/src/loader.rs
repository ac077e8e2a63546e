//! Content loader
//!
//! Fetches the content document once, from an `http(s)` URL or a local
//! path. Any failure (network, I/O, JSON) is logged and replaced by the
//! minimal document so the page still renders.

use folio_common::content::ContentDocument;
use folio_common::{Error, Result};
use reqwest::header::CACHE_CONTROL;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info};

/// Load and parse the content document, degrading to the minimal one
pub async fn load_content(source: &str) -> ContentDocument {
    match try_load_content(source).await {
        Ok(doc) => {
            info!("Loaded content document from {}", source);
            doc
        }
        Err(e) => {
            error!("Failed to load content document {}: {}", source, e);
            ContentDocument::minimal()
        }
    }
}

/// Load and parse the content document, surfacing the failure
pub async fn try_load_content(source: &str) -> Result<ContentDocument> {
    let text = fetch_text(source).await?;
    ContentDocument::from_json(&text)
}

async fn fetch_text(source: &str) -> Result<String> {
    if source.trim().is_empty() {
        return Err(Error::InvalidInput("empty content source".to_string()));
    }
    if is_remote(source) {
        let response = reqwest::Client::new()
            .get(source)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    } else if source.contains("://") {
        Err(Error::InvalidInput(format!("unsupported content source {}", source)))
    } else {
        match tokio::fs::read_to_string(Path::new(source)).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(source.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
