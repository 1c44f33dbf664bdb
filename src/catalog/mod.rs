mod catalog_error;
mod matching;
mod models;
mod spotify;

pub use catalog_error::CatalogError;
pub use matching::{advanced_query, naive_query, pick_best_match};
pub use models::{AudioFeatures, CatalogTrack};
pub use spotify::SpotifyCatalog;

use async_trait::async_trait;

/// A music catalog that can be searched by free-text track queries.
///
/// Authentication and sessions belong to the implementation; callers only
/// see lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog {
    /// Searches tracks, returning at most `limit` candidates in provider order.
    async fn search_tracks(&self, query: &str, limit: u32)
        -> Result<Vec<CatalogTrack>, CatalogError>;

    /// Numeric audio attributes of a track, `None` when the provider has none.
    async fn audio_features(&self, track_id: &str)
        -> Result<Option<AudioFeatures>, CatalogError>;
}
