use std::path::Path;

use anyhow::Context;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::TrackingRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const SEED_ACTIVITY: &str = "Networking Basics Check";

/// Inserts a demo activity with three learners and returns its id.
pub async fn seed(pool: &PgPool) -> anyhow::Result<i64> {
    let scorm_id: i64 = sqlx::query(
        r#"
        INSERT INTO scorm_heatmap.scorm (course, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET course = EXCLUDED.course
        RETURNING id
        "#,
    )
    .bind(101_i64)
    .bind(SEED_ACTIVITY)
    .fetch_one(pool)
    .await?
    .get("id");

    let learners = vec![
        (201_i64, "correct", "a,b"),
        (202_i64, "wrong", "a,d"),
        (203_i64, "correct", "a,b,c"),
    ];

    for (user_id, result, picks) in learners {
        let elements = [
            ("cmi.core.lesson_status", "completed"),
            ("cmi.interactions_0.id", "tcp-is-reliable"),
            ("cmi.interactions_0.type", "true-false"),
            ("cmi.interactions_0.result", result),
            ("cmi.interactions_1.id", "transport-protocols"),
            ("cmi.interactions_1.type", "choice"),
            ("cmi.interactions_1.student_response", picks),
            ("cmi.interactions_1.correct_responses_0.pattern", "a,b,c"),
        ];

        for (element, value) in elements {
            insert_track(
                pool,
                scorm_id,
                user_id,
                1,
                element,
                value,
                &format!("seed-{user_id}-{element}"),
            )
            .await?;
        }
    }

    Ok(scorm_id)
}

async fn insert_track(
    pool: &PgPool,
    scorm_id: i64,
    user_id: i64,
    attempt: i32,
    element: &str,
    value: &str,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO scorm_heatmap.scorm_scoes_track
        (scorm_id, user_id, attempt, element, value, source_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(scorm_id)
    .bind(user_id)
    .bind(attempt)
    .bind(element)
    .bind(value)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_activity_name(pool: &PgPool, scorm_id: i64) -> anyhow::Result<String> {
    let row = sqlx::query("SELECT name FROM scorm_heatmap.scorm WHERE id = $1")
        .bind(scorm_id)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("invalid scorm id {scorm_id}"))?;

    Ok(row.get("name"))
}

/// Every tracking row recorded for one activity.
pub async fn fetch_tracking(pool: &PgPool, scorm_id: i64) -> anyhow::Result<Vec<TrackingRecord>> {
    let rows = sqlx::query(
        "SELECT id, user_id, attempt, element, value, time_modified \
         FROM scorm_heatmap.scorm_scoes_track \
         WHERE scorm_id = $1",
    )
    .bind(scorm_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to fetch tracking rows for scorm {scorm_id}"))?;

    let records: Vec<TrackingRecord> = rows
        .into_iter()
        .map(|row| TrackingRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            attempt: row.get("attempt"),
            element: row.get("element"),
            value: row.get("value"),
            time_modified: row.get("time_modified"),
        })
        .collect();

    let latest = records.iter().filter_map(|record| record.time_modified).max();
    debug!(scorm_id, rows = records.len(), ?latest, "fetched tracking rows");
    Ok(records)
}

#[derive(Debug, serde::Deserialize)]
pub struct CsvTrack {
    pub scorm_id: i64,
    pub user_id: i64,
    #[serde(default = "first_attempt")]
    pub attempt: i32,
    pub element: String,
    pub value: String,
    pub source_key: Option<String>,
}

fn first_attempt() -> i32 {
    1
}

pub fn read_csv(csv_path: &Path) -> anyhow::Result<Vec<CsvTrack>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut rows = Vec::new();

    for result in reader.deserialize::<CsvTrack>() {
        rows.push(result?);
    }

    Ok(rows)
}

pub async fn import_csv(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    let rows = read_csv(csv_path)?;
    let mut inserted = 0usize;

    for row in rows {
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_track(
            pool,
            row.scorm_id,
            row.user_id,
            row.attempt,
            &row.element,
            &row.value,
            &source_key,
        )
        .await?
        {
            inserted += 1;
        }
    }

    info!(inserted, path = %csv_path.display(), "imported tracking rows");
    Ok(inserted)
}
