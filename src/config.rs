use std::str::FromStr;

use crate::error::{HeatmapError, Result};

pub const DEFAULT_BANDS: usize = 10;

/// Number of score bands, and of stacked regions in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCount(usize);

impl BandCount {
    pub fn new(count: usize) -> Result<Self> {
        if count < 2 {
            return Err(HeatmapError::InvalidBandCount(count));
        }
        Ok(Self(count))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Width of one band on the 0..=100 scale.
    pub fn width(self) -> f64 {
        100.0 / (self.0 - 1) as f64
    }
}

impl Default for BandCount {
    fn default() -> Self {
        Self(DEFAULT_BANDS)
    }
}

impl FromStr for BandCount {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let count: usize = value
            .parse()
            .map_err(|_| format!("'{value}' is not a whole number"))?;
        BandCount::new(count).map_err(|err| err.to_string())
    }
}

/// How tracking rows are grouped into attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptMode {
    /// All attempts of a learner fold into one row.
    #[default]
    PerLearner,
    PerAttempt,
}

impl AttemptMode {
    pub fn key(self, user_id: i64, attempt: i32) -> String {
        match self {
            AttemptMode::PerLearner => user_id.to_string(),
            AttemptMode::PerAttempt => format!("{user_id}-{attempt}"),
        }
    }
}
