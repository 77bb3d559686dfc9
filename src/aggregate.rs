use tracing::debug;

use crate::config::BandCount;
use crate::error::{HeatmapError, Result};
use crate::models::{Histogram, PercentMatrix};

const NO_DATA: [f64; 1] = [0.0];

/// Per-question averages, or the marker for an activity nobody attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum Averages {
    NoData,
    Computed(Vec<f64>),
}

impl Averages {
    /// Values as handed to the chart; `NoData` reads as `[0]`.
    pub fn values(&self) -> &[f64] {
        match self {
            Averages::NoData => &NO_DATA,
            Averages::Computed(values) => values,
        }
    }

    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, Averages::NoData)
    }
}

/// Column means over the attempts that carry a score for each question.
pub fn get_average(matrix: &PercentMatrix) -> Averages {
    if matrix.is_empty() {
        return Averages::NoData;
    }

    let columns = matrix.question_count();
    let mut sums = vec![0.0; columns];
    let mut counts = vec![0usize; columns];

    for row in matrix.rows.values() {
        for (column, cell) in row.iter().enumerate().take(columns) {
            if let Some(value) = cell {
                sums[column] += value;
                counts[column] += 1;
            }
        }
    }

    Averages::Computed(
        sums.into_iter()
            .zip(counts)
            .map(|(sum, count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect(),
    )
}

/// Band a score falls into; truncating, so 100 lands in the top band.
pub fn band_index(value: f64, bands: BandCount) -> usize {
    let top = bands.get() - 1;
    let scaled = (value * top as f64 / 100.0).floor();
    if scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(top)
    }
}

/// Share of attempts per band and question, in percent.
///
/// Each column is normalized by the attempts that have a score for it, so
/// every column with data sums to 100.
pub fn get_categories(matrix: &PercentMatrix, bands: BandCount) -> Result<Histogram> {
    if matrix.is_empty() {
        return Err(HeatmapError::EmptyDataset);
    }

    let columns = matrix.question_count();
    let mut histogram = vec![vec![0.0; columns]; bands.get()];
    let mut answered = vec![0usize; columns];

    for row in matrix.rows.values() {
        for (column, cell) in row.iter().enumerate().take(columns) {
            if let Some(value) = cell {
                histogram[band_index(*value, bands)][column] += 1.0;
                answered[column] += 1;
            }
        }
    }

    for band in histogram.iter_mut() {
        for (cell, count) in band.iter_mut().zip(&answered) {
            if *count > 0 {
                *cell = *cell * 100.0 / *count as f64;
            }
        }
    }

    debug!(
        bands = bands.get(),
        questions = columns,
        attempts = matrix.attempt_count(),
        "built score histogram"
    );
    Ok(histogram)
}
