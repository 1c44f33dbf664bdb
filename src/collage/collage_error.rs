use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollageError {
    /// No image could be used; nothing was written.
    #[error("no usable images to compose")]
    EmptyInput,
    #[error("font not found: {0}")]
    FontNotFound(String),
    #[error("invalid font file {path}")]
    InvalidFont { path: PathBuf },
    #[error("invalid collage option: {0}")]
    InvalidOption(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}
