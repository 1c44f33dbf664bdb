mod enricher;
mod snapshot;

pub use enricher::{enrich, EnrichOptions, Enrichment};
pub use snapshot::{snapshot_file_name, EnrichedEntry, Snapshot, SnapshotError};
