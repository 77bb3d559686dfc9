use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct TrackingRecord {
    pub id: i64,
    pub user_id: i64,
    pub attempt: i32,
    pub element: String,
    pub value: String,
    pub time_modified: Option<NaiveDateTime>,
}

/// Identifies one learner submission: `user_id`, or `user_id-attempt`
/// when attempts are tracked separately.
pub type AttemptKey = String;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionRecord {
    pub fields: HashMap<String, String>,
    pub correct_responses: Vec<String>,
}

impl QuestionRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn question_type(&self) -> Option<&str> {
        self.field("type")
    }
}

pub type ParsedData = BTreeMap<AttemptKey, BTreeMap<u32, QuestionRecord>>;

/// Attempt × question grid of scores. `None` marks a question the attempt
/// has no score for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentMatrix {
    pub questions: Vec<u32>,
    pub rows: BTreeMap<AttemptKey, Vec<Option<f64>>>,
}

impl PercentMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn attempt_count(&self) -> usize {
        self.rows.len()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// Band × question grid of attempt percentages.
pub type Histogram = Vec<Vec<f64>>;

/// Same shape as [`Histogram`], one `#rrggbb` string per cell.
pub type ColorGrid = Vec<Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub colors: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub line_series: LineSeries,
    pub bar_series: Vec<BarSeries>,
    pub labels: Vec<String>,
    pub y_max: f64,
    pub y_step: f64,
    pub stacked: bool,
    pub legend: bool,
}
