use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("IO error reading dataset: {0}")]
    Io(#[from] io::Error),
    #[error("dataset parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no chart data for the week of {0}")]
    WeekNotFound(NaiveDate),
}
