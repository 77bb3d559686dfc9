use tracing::info;

use crate::aggregate::{self, Averages};
use crate::chart::{self, Strings};
use crate::color;
use crate::config::{AttemptMode, BandCount};
use crate::error::Result;
use crate::models::{ChartSpec, Histogram, PercentMatrix, TrackingRecord};
use crate::scoring::{self, RuleRegistry};
use crate::tracking;

#[derive(Debug, Clone, Default)]
pub struct HeatmapOptions {
    pub bands: BandCount,
    pub mode: AttemptMode,
}

/// Everything derived for one activity in a single pass.
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub matrix: PercentMatrix,
    pub averages: Averages,
    /// `None` when nobody attempted the activity.
    pub histogram: Option<Histogram>,
    pub chart: ChartSpec,
}

pub fn build(
    records: &[TrackingRecord],
    options: &HeatmapOptions,
    registry: &RuleRegistry,
    strings: &dyn Strings,
) -> Result<Heatmap> {
    let parsed = tracking::parse_records(records, options.mode);
    let matrix = scoring::score_attempts(&parsed, registry);
    let averages = aggregate::get_average(&matrix);

    if averages.is_empty_dataset() {
        info!(records = records.len(), "no attempts to chart");
        let chart = chart::assemble(&averages, None, options.bands, strings);
        return Ok(Heatmap {
            matrix,
            averages,
            histogram: None,
            chart,
        });
    }

    let histogram = aggregate::get_categories(&matrix, options.bands)?;
    let colors = color::color_grid(&histogram);
    let chart = chart::assemble(
        &averages,
        Some((&histogram, &colors)),
        options.bands,
        strings,
    );

    info!(
        attempts = matrix.attempt_count(),
        questions = matrix.question_count(),
        "heatmap built"
    );

    Ok(Heatmap {
        matrix,
        averages,
        histogram: Some(histogram),
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::EnglishStrings;

    fn record(id: i64, user_id: i64, element: &str, value: &str) -> TrackingRecord {
        TrackingRecord {
            id,
            user_id,
            attempt: 1,
            element: element.to_string(),
            value: value.to_string(),
            time_modified: None,
        }
    }

    fn sample_records() -> Vec<TrackingRecord> {
        let mut records = Vec::new();
        let mut id = 0;
        let mut push = |user: i64, element: &str, value: &str| {
            id += 1;
            records.push(record(id, user, element, value));
        };

        let answers = [(1, "correct", "1,2"), (2, "wrong", "1,4"), (3, "correct", "1,2,3")];
        for (user, tf_result, picks) in answers {
            push(user, "cmi.core.lesson_status", "completed");
            push(user, "cmi.interactions_0.type", "true-false");
            push(user, "cmi.interactions_0.result", tf_result);
            push(user, "cmi.interactions_1.type", "choice");
            push(user, "cmi.interactions_1.student_response", picks);
            push(user, "cmi.interactions_1.correct_responses_0.pattern", "1,2,3");
            push(user, "cmi.interactions_2.type", "fill-in");
            push(user, "cmi.interactions_2.student_response", "paris");
        }
        records
    }

    fn build_default(records: &[TrackingRecord]) -> Heatmap {
        build(
            records,
            &HeatmapOptions::default(),
            &RuleRegistry::default(),
            &EnglishStrings,
        )
        .unwrap()
    }

    #[test]
    fn runs_the_full_pipeline() {
        let heatmap = build_default(&sample_records());

        assert_eq!(heatmap.matrix.questions, vec![0, 1]);
        assert_eq!(heatmap.matrix.attempt_count(), 3);

        let averages = heatmap.averages.values();
        assert!((averages[0] - 200.0 / 3.0).abs() < 1e-9);
        // choice scores: 2 of 3, 1 of 3 plus a wrong pick, all 3
        assert!((averages[1] - (200.0 / 3.0 + 25.0 + 100.0) / 3.0).abs() < 1e-9);

        let histogram = heatmap.histogram.as_ref().unwrap();
        assert!((histogram[9][0] - 200.0 / 3.0).abs() < 1e-9);
        assert!((histogram[0][0] - 100.0 / 3.0).abs() < 1e-9);

        assert_eq!(heatmap.chart.bar_series.len(), 10);
        assert_eq!(heatmap.chart.labels, vec!["Question 1", "Question 2"]);
    }

    #[test]
    fn identical_input_gives_identical_chart() {
        let records = sample_records();
        let mut shuffled = records.clone();
        shuffled.reverse();

        let first = build_default(&records);
        let second = build_default(&records);
        let reordered = build_default(&shuffled);
        assert_eq!(first.chart, second.chart);
        assert_eq!(first.chart, reordered.chart);
        assert_eq!(
            serde_json::to_string(&first.chart).unwrap(),
            serde_json::to_string(&second.chart).unwrap()
        );
    }

    #[test]
    fn empty_activity_short_circuits() {
        let heatmap = build_default(&[]);
        assert!(heatmap.averages.is_empty_dataset());
        assert_eq!(heatmap.averages.values(), &[0.0]);
        assert!(heatmap.histogram.is_none());
        assert!(heatmap.chart.bar_series.is_empty());
    }

    #[test]
    fn single_perfect_attempt_fills_top_band() {
        let records = vec![
            record(1, 8, "cmi.interactions_0.type", "true-false"),
            record(2, 8, "cmi.interactions_0.result", "correct"),
        ];
        let heatmap = build_default(&records);
        let histogram = heatmap.histogram.unwrap();
        for (band, row) in histogram.iter().enumerate() {
            let expected = if band == 9 { 100.0 } else { 0.0 };
            assert_eq!(row[0], expected);
        }
        assert_eq!(heatmap.chart.bar_series[9].colors, vec!["#000080"]);
    }
}
