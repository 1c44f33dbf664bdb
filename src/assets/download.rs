use crate::assets::FetchError;
use crate::configuration::CatalogSettings;
use crate::foundation::http::download_client;
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

/// Fetches the raw bytes behind an artwork URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// True when the bytes start like an image format the composer can decode.
pub fn looks_like_image(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok()
}

pub struct HttpDownloader {
    http: Client,
}

impl HttpDownloader {
    pub fn new(settings: &CatalogSettings) -> reqwest::Result<Self> {
        Ok(Self {
            http: download_client(settings)?,
        })
    }
}

#[async_trait]
impl AssetDownloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "asset.download");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = &content_type {
            if !content_type.starts_with("image/") {
                return Err(FetchError::NotAnImage {
                    url: url.to_string(),
                    content_type: content_type.clone(),
                });
            }
        }

        let bytes = response.bytes().await?;
        if !looks_like_image(&bytes) {
            return Err(FetchError::NotAnImage {
                url: url.to_string(),
                content_type: content_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        Ok(bytes.to_vec())
    }
}
