pub mod actions;
pub mod assets;
pub mod catalog;
pub mod chart;
pub mod collage;
pub mod configuration;
pub mod enrich;
pub mod foundation;

pub use actions::{compose_collage, fetch_assets, load_and_enrich, PosterRequest, StageReport};
pub use chart::{ChartDataset, ChartEntry};
pub use configuration::*;
pub use enrich::{EnrichedEntry, Snapshot};
