use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog credentials are not configured (set catalog.client_id/client_secret or SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET)")]
    MissingCredentials,
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
