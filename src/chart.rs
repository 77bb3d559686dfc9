use tracing::info;

use crate::aggregate::Averages;
use crate::config::BandCount;
use crate::models::{BarSeries, ChartSpec, ColorGrid, Histogram, LineSeries};

/// Display strings looked up by short key.
pub trait Strings {
    fn get(&self, key: &str) -> String;
}

pub struct EnglishStrings;

impl Strings for EnglishStrings {
    fn get(&self, key: &str) -> String {
        match key {
            "average" => "Average".to_string(),
            "question" => "Question".to_string(),
            other => other.to_string(),
        }
    }
}

/// Stacked bar heatmap with the average overlaid as a line.
///
/// Every region is drawn at the same height; the histogram shows through
/// the color of each segment. With no attempts only the average line is
/// emitted.
pub fn assemble(
    averages: &Averages,
    shading: Option<(&Histogram, &ColorGrid)>,
    regions: BandCount,
    strings: &dyn Strings,
) -> ChartSpec {
    let step = 100.0 / regions.get() as f64;
    let values = averages.values().to_vec();
    let question = strings.get("question");
    let labels = (0..values.len())
        .map(|i| format!("{question} {}", i + 1))
        .collect();

    let bar_series = match shading {
        Some((histogram, colors)) if !averages.is_empty_dataset() => {
            info!(
                regions = regions.get(),
                bands = histogram.len(),
                "shading heatmap regions"
            );
            colors
                .iter()
                .take(regions.get())
                .map(|band| BarSeries {
                    colors: band.clone(),
                    values: vec![step; band.len()],
                })
                .collect()
        }
        _ => Vec::new(),
    };

    ChartSpec {
        line_series: LineSeries {
            label: strings.get("average"),
            values,
        },
        bar_series,
        labels,
        y_max: 100.0,
        y_step: step,
        stacked: true,
        legend: false,
    }
}
