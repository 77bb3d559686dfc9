use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::models::{ParsedData, PercentMatrix, QuestionRecord};

/// Turns one question's raw answer data into a 0..=100 score.
pub trait ScoringRule: Send + Sync {
    fn score(&self, question: &QuestionRecord) -> f64;
}

impl<F> ScoringRule for F
where
    F: Fn(&QuestionRecord) -> f64 + Send + Sync,
{
    fn score(&self, question: &QuestionRecord) -> f64 {
        self(question)
    }
}

/// Scoring rules keyed by SCORM interaction type, hyphens removed.
pub struct RuleRegistry {
    rules: HashMap<String, Box<dyn ScoringRule>>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn register(&mut self, question_type: &str, rule: impl ScoringRule + 'static) {
        self.rules
            .insert(normalize_type(question_type), Box::new(rule));
    }

    pub fn lookup(&self, question_type: &str) -> Option<&dyn ScoringRule> {
        self.rules
            .get(&normalize_type(question_type))
            .map(|rule| rule.as_ref())
    }

    /// Scores a question, or `None` when its type has no rule.
    pub fn score(&self, question: &QuestionRecord) -> Option<f64> {
        let rule = self.lookup(question.question_type()?)?;
        Some(rule.score(question).clamp(0.0, 100.0))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("true-false", score_true_false);
        registry.register("choice", score_choice);
        registry
    }
}

fn normalize_type(question_type: &str) -> String {
    question_type.replace('-', "")
}

fn split_ids(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

pub fn score_true_false(question: &QuestionRecord) -> f64 {
    if question.field("result") == Some("correct") {
        100.0
    } else {
        0.0
    }
}

/// Partial credit for multiple response questions.
///
/// Each accepted answer set is tried in turn: picks inside the set count as
/// correct, picks outside it widen the denominator. The best set wins.
pub fn score_choice(question: &QuestionRecord) -> f64 {
    let selected = split_ids(question.field("student_response").unwrap_or_default());

    question
        .correct_responses
        .iter()
        .map(|pattern| {
            let accepted = split_ids(pattern);
            let correct = selected.iter().filter(|id| accepted.contains(*id)).count();
            let total = accepted.len() + (selected.len() - correct);
            if total == 0 {
                100.0
            } else {
                correct as f64 * 100.0 / total as f64
            }
        })
        .fold(None, |best: Option<f64>, score| {
            Some(best.map_or(score, |best| best.max(score)))
        })
        .unwrap_or(0.0)
}

/// Scores every attempt into a rectangular matrix.
///
/// Columns are the questions scored in any attempt, in question order; an
/// attempt without a score for a column gets `None` there.
pub fn score_attempts(parsed: &ParsedData, registry: &RuleRegistry) -> PercentMatrix {
    let mut scored: BTreeMap<String, BTreeMap<u32, f64>> = BTreeMap::new();
    let mut questions = BTreeSet::new();
    let mut unscored = 0usize;

    for (attempt, records) in parsed {
        let row = scored.entry(attempt.clone()).or_default();
        for (index, question) in records {
            match registry.score(question) {
                Some(score) => {
                    row.insert(*index, score);
                    questions.insert(*index);
                }
                None => unscored += 1,
            }
        }
    }

    if unscored > 0 {
        debug!(unscored, "questions without a scoring rule were left out");
    }

    let questions: Vec<u32> = questions.into_iter().collect();
    let mut padded = 0usize;
    let rows = scored
        .into_iter()
        .map(|(attempt, row)| {
            let cells: Vec<Option<f64>> = questions
                .iter()
                .map(|index| row.get(index).copied())
                .collect();
            padded += cells.iter().filter(|cell| cell.is_none()).count();
            (attempt, cells)
        })
        .collect();

    if padded > 0 {
        warn!(padded, "attempts answered different question sets; gaps padded");
    }

    PercentMatrix { questions, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(fields: &[(&str, &str)], correct: &[&str]) -> QuestionRecord {
        QuestionRecord {
            fields: fields
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            correct_responses: correct.iter().map(|value| value.to_string()).collect(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.001,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn true_false_scores_all_or_nothing() {
        assert_eq!(score_true_false(&question(&[("result", "correct")], &[])), 100.0);
        assert_eq!(score_true_false(&question(&[("result", "wrong")], &[])), 0.0);
        assert_eq!(score_true_false(&question(&[], &[])), 0.0);
    }

    #[test]
    fn choice_gives_partial_credit() {
        let q = question(&[("student_response", "1,2")], &["1,2,3"]);
        assert_close(score_choice(&q), 200.0 / 3.0);
    }

    #[test]
    fn choice_penalizes_wrong_picks() {
        let q = question(&[("student_response", "1,4")], &["1,2"]);
        assert_close(score_choice(&q), 100.0 / 3.0);
    }

    #[test]
    fn choice_takes_most_favorable_answer_set() {
        let q = question(&[("student_response", "3")], &["1,2", "3"]);
        assert_eq!(score_choice(&q), 100.0);
    }

    #[test]
    fn choice_with_nothing_required_and_nothing_picked_is_correct() {
        let q = question(&[("student_response", "")], &[""]);
        assert_eq!(score_choice(&q), 100.0);
    }

    #[test]
    fn choice_without_answer_sets_scores_zero() {
        let q = question(&[("student_response", "1")], &[]);
        assert_eq!(score_choice(&q), 0.0);
    }

    #[test]
    fn registry_strips_hyphens_and_ignores_unknown_types() {
        let registry = RuleRegistry::default();
        let tf = question(&[("type", "true-false"), ("result", "correct")], &[]);
        assert_eq!(registry.score(&tf), Some(100.0));

        let fill_in = question(&[("type", "fill-in"), ("result", "correct")], &[]);
        assert_eq!(registry.score(&fill_in), None);
        assert_eq!(registry.score(&question(&[], &[])), None);
    }

    #[test]
    fn custom_rules_can_be_registered() {
        let mut registry = RuleRegistry::empty();
        registry.register("numeric", |_: &QuestionRecord| 150.0);
        let q = question(&[("type", "numeric")], &[]);
        assert_eq!(registry.score(&q), Some(100.0));
    }

    #[test]
    fn pads_attempts_missing_a_question() {
        let mut parsed = ParsedData::new();
        parsed.entry("1".to_string()).or_default().extend([
            (0, question(&[("type", "true-false"), ("result", "correct")], &[])),
            (1, question(&[("type", "true-false"), ("result", "wrong")], &[])),
            (2, question(&[("type", "matching")], &[])),
        ]);
        parsed.entry("2".to_string()).or_default().insert(
            1,
            question(&[("type", "true-false"), ("result", "correct")], &[]),
        );

        let matrix = score_attempts(&parsed, &RuleRegistry::default());
        assert_eq!(matrix.questions, vec![0, 1]);
        assert_eq!(matrix.rows["1"], vec![Some(100.0), Some(0.0)]);
        assert_eq!(matrix.rows["2"], vec![None, Some(100.0)]);
    }
}
