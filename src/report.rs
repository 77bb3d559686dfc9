use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::config::BandCount;
use crate::heatmap::Heatmap;

/// Lowest score covered by each band, for table headers.
fn band_floor(band: usize, bands: BandCount) -> f64 {
    (band as f64 * bands.width()).min(100.0)
}

pub fn build_report(
    activity: &str,
    generated_at: NaiveDateTime,
    bands: BandCount,
    heatmap: &Heatmap,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# SCORM Heatmap Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} attempts, {})",
        activity,
        heatmap.matrix.attempt_count(),
        generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Question Averages");

    if heatmap.averages.is_empty_dataset() {
        let _ = writeln!(output, "No attempts recorded for this activity.");
        return output;
    }

    for (column, average) in heatmap.averages.values().iter().enumerate() {
        let question = heatmap.matrix.questions.get(column).copied().unwrap_or_default();
        let _ = writeln!(
            output,
            "- Question {} (interaction {}): {:.1}% correct",
            column + 1,
            question,
            average
        );
    }

    let Some(histogram) = &heatmap.histogram else {
        return output;
    };

    let _ = writeln!(output);
    let _ = writeln!(output, "## Score Distribution");
    let _ = write!(output, "| Band |");
    for column in 0..heatmap.matrix.question_count() {
        let _ = write!(output, " Q{} |", column + 1);
    }
    let _ = writeln!(output);
    let _ = write!(output, "|---|");
    for _ in 0..heatmap.matrix.question_count() {
        let _ = write!(output, "---|");
    }
    let _ = writeln!(output);

    for (band, row) in histogram.iter().enumerate().rev() {
        let _ = write!(output, "| {:.0}%+ |", band_floor(band, bands));
        for share in row {
            let _ = write!(output, " {:.1}% |", share);
        }
        let _ = writeln!(output);
    }

    let weakest = heatmap
        .averages
        .values()
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));

    if let Some((column, average)) = weakest {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Weakest Question");
        let _ = writeln!(
            output,
            "- Question {} averages {:.1}% correct",
            column + 1,
            average
        );
    }

    output
}
