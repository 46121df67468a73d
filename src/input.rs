use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::models::{TaskSignal, TaskStatus};

/// Loads any snapshot type from a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid snapshot in {}", path.display()))
}

pub fn import_task_signals(csv_path: &Path) -> anyhow::Result<Vec<TaskSignal>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    read_task_signals(file)
}

/// Reads task signals from CSV with a header row. Empty optional columns
/// become `None`.
pub fn read_task_signals<R: Read>(reader: R) -> anyhow::Result<Vec<TaskSignal>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: i64,
        title: String,
        status: TaskStatus,
        assignee_id: Option<i64>,
        story_points: u32,
        created_at: DateTime<Utc>,
        started_at: Option<DateTime<Utc>>,
        active_blocker_count: Option<u32>,
        sprint_end_date: DateTime<Utc>,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut signals = Vec::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad task row {}", line + 1))?;
        signals.push(TaskSignal {
            id: row.id,
            title: row.title,
            status: row.status,
            assignee_id: row.assignee_id,
            story_points: row.story_points,
            created_at: row.created_at,
            started_at: row.started_at,
            active_blocker_count: row.active_blocker_count.unwrap_or(0),
            sprint_end_date: row.sprint_end_date,
        });
    }

    Ok(signals)
}
