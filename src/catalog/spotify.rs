//! Spotify Web API implementation of the catalog.
//!
//! Uses the client-credentials grant. One token is requested when the client
//! connects and reused for the whole batch.

use crate::catalog::{AudioFeatures, Catalog, CatalogError, CatalogTrack};
use crate::configuration::CatalogSettings;
use crate::foundation::http::json_client;
use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: Option<SpotifyAlbum>,
    duration_ms: Option<u64>,
    explicit: Option<bool>,
    popularity: Option<u32>,
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    name: Option<String>,
    release_date: Option<String>,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl SpotifyTrack {
    /// Local tracks carry no id and cannot be referenced later, so they are dropped.
    fn into_catalog_track(self) -> Option<CatalogTrack> {
        let id = self.id?;
        let (album_name, release_date, image_url) = match self.album {
            Some(album) => {
                let image_url = largest_image(&album.images);
                (album.name, album.release_date, image_url)
            }
            None => (None, None, None),
        };

        Some(CatalogTrack {
            id,
            name: self.name,
            artists: self.artists.into_iter().map(|artist| artist.name).collect(),
            album_name,
            release_date,
            image_url,
            duration_ms: self.duration_ms,
            explicit: self.explicit,
            popularity: self.popularity,
            track_url: self.external_urls.and_then(|urls| urls.spotify),
        })
    }
}

fn largest_image(images: &[SpotifyImage]) -> Option<String> {
    images
        .iter()
        .enumerate()
        .max_by_key(|(index, image)| {
            let area = u64::from(image.width.unwrap_or(0)) * u64::from(image.height.unwrap_or(0));
            // Equal areas (usually "unknown") resolve to the earliest entry.
            (area, std::cmp::Reverse(*index))
        })
        .map(|(_, image)| image.url.clone())
}

/// Keeps every numeric member of an audio-features object.
fn numeric_features(value: &Value) -> Option<AudioFeatures> {
    let features: AudioFeatures = value
        .as_object()?
        .iter()
        .filter_map(|(key, member)| member.as_f64().map(|number| (key.clone(), number)))
        .collect();
    (!features.is_empty()).then_some(features)
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub struct SpotifyCatalog {
    http: Client,
    api_base: Url,
    bearer: String,
}

impl SpotifyCatalog {
    /// Builds the HTTP client and exchanges the client credentials for a token.
    pub async fn connect(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let (client_id, client_secret) = settings
            .credentials()
            .ok_or(CatalogError::MissingCredentials)?;
        let api_base = ensure_trailing_slash(Url::parse(&settings.api_base_url)?);
        let token_url = Url::parse(&settings.token_url)?;
        let http = json_client(settings)?;

        let response = http
            .post(token_url)
            .basic_auth(&client_id, Some(&client_secret))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        debug!("catalog.token.acquired");

        Ok(Self {
            http,
            api_base,
            bearer: token.access_token,
        })
    }

    async fn checked(response: Response) -> Result<Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(CatalogError::RateLimited { retry_after });
        }
        let message = response.text().await.unwrap_or_default();
        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    /// GET /v1/search?type=track&q=...&limit=...
    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        let url = self.api_base.join("search")?;
        let limit = limit.max(1).to_string();
        debug!(query, limit = %limit, "catalog.search");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.bearer)
            .query(&[
                ("type", "track"),
                ("q", query),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let body: SearchResponse = Self::checked(response).await?.json().await?;
        Ok(body
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(SpotifyTrack::into_catalog_track)
            .collect())
    }

    /// GET /v1/audio-features/{id}
    async fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>, CatalogError> {
        let url = self.api_base.join(&format!("audio-features/{track_id}"))?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Value = Self::checked(response).await?.json().await?;
        Ok(numeric_features(&body))
    }
}
