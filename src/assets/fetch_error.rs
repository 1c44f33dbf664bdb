use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why an asset could not be stored.
///
/// Per-entry failures are counted and skipped; only a destination folder
/// that cannot be created fails the whole fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("response from {url} is not an image ({content_type})")]
    NotAnImage { url: String, content_type: String },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}
