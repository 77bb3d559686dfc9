//! Domain errors for the heatmap pipeline.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeatmapError {
    /// No attempts were recorded for the activity.
    #[error("no attempts recorded for this activity")]
    EmptyDataset,

    /// Band counts below two leave no band width to divide by.
    #[error("band count must be at least 2, got {0}")]
    InvalidBandCount(usize),
}

pub type Result<T> = std::result::Result<T, HeatmapError>;
