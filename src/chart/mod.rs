mod chart_error;
mod loader;
mod models;
mod stats;

pub use chart_error::ChartError;
pub use loader::ChartDataset;
pub use models::{ChartEntry, ChartRow};
pub use stats::PerformerCount;
