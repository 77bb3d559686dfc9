use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::AttemptMode;
use crate::models::{ParsedData, TrackingRecord};

fn interaction_regex() -> &'static Regex {
    static INTERACTION: OnceLock<Regex> = OnceLock::new();
    INTERACTION.get_or_init(|| {
        Regex::new(r"cmi\.interactions_([0-9]+)\.(.+)").expect("interaction pattern is valid")
    })
}

fn correct_response_regex() -> &'static Regex {
    static CORRECT_RESPONSE: OnceLock<Regex> = OnceLock::new();
    CORRECT_RESPONSE.get_or_init(|| {
        Regex::new(r"^correct_responses_[0-9]+\.pattern$")
            .expect("correct response pattern is valid")
    })
}

/// Splits an element path into its interaction index and field suffix.
pub fn split_element(element: &str) -> Option<(u32, &str)> {
    let captures = interaction_regex().captures(element)?;
    let index = captures.get(1)?.as_str().parse().ok()?;
    Some((index, captures.get(2)?.as_str()))
}

/// Groups raw tracking rows into attempts and questions.
///
/// Rows are scanned in `id` order. Rows outside `cmi.interactions_*` still
/// register their attempt but contribute no question data.
pub fn parse_records(records: &[TrackingRecord], mode: AttemptMode) -> ParsedData {
    let mut ordered: Vec<&TrackingRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.id);

    let mut parsed = ParsedData::new();
    let mut skipped = 0usize;

    for record in ordered {
        let questions = parsed
            .entry(mode.key(record.user_id, record.attempt))
            .or_default();

        let Some((index, suffix)) = split_element(&record.element) else {
            skipped += 1;
            continue;
        };

        let question = questions.entry(index).or_default();
        if correct_response_regex().is_match(suffix) {
            question.correct_responses.push(record.value.clone());
        } else {
            question
                .fields
                .insert(suffix.to_string(), record.value.clone());
        }
    }

    debug!(attempts = parsed.len(), skipped, "parsed tracking records");
    parsed
}
