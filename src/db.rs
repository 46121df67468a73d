//! Read-only snapshot loaders over the SprintIQ Postgres store.
//!
//! Each loader resolves identifiers first and reports a not-found error, so
//! scorers only ever see snapshots of rows that exist.

use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::health::MOOD_WINDOW_DAYS;
use crate::models::{
    ActiveSprintStats, BlockerNote, BlockerSeverity, CompletedSprintStats, MemberTask,
    MemberWork, MoodSample, SprintSnapshot, StandupEntry, TaskOutcome, TaskSignal, TaskStatus,
    TeamSnapshot,
};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config.require_database_url()?;
    let max_connections = config.max_connections()?;
    PgPoolOptions::new()
        .max_connections(max_connections.get())
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

struct TaskCounts {
    total: u32,
    completed: u32,
    in_progress: u32,
    todo: u32,
    unassigned_open: u32,
}

async fn task_counts(pool: &PgPool, sprint_id: i64) -> Result<TaskCounts> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'Done') AS completed,
            COUNT(*) FILTER (WHERE status = 'InProgress') AS in_progress,
            COUNT(*) FILTER (WHERE status = 'Todo') AS todo,
            COUNT(*) FILTER (WHERE assignee_id IS NULL AND status <> 'Done') AS unassigned_open
        FROM sprint_tasks
        WHERE sprint_id = $1
        "#,
    )
    .bind(sprint_id)
    .fetch_one(pool)
    .await?;

    Ok(TaskCounts {
        total: count(&row, "total")?,
        completed: count(&row, "completed")?,
        in_progress: count(&row, "in_progress")?,
        todo: count(&row, "todo")?,
        unassigned_open: count(&row, "unassigned_open")?,
    })
}

async fn active_blocker_count(pool: &PgPool, sprint_id: i64) -> Result<u32> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS active
        FROM blockers b
        JOIN sprint_tasks t ON t.id = b.task_id
        WHERE t.sprint_id = $1 AND b.status <> 'Resolved'
        "#,
    )
    .bind(sprint_id)
    .fetch_one(pool)
    .await?;

    count(&row, "active")
}

pub async fn fetch_sprint_snapshot(pool: &PgPool, sprint_id: i64) -> Result<SprintSnapshot> {
    let row = sqlx::query("SELECT id, name, start_date, end_date FROM sprints WHERE id = $1")
        .bind(sprint_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::SprintNotFound(sprint_id))?;

    let counts = task_counts(pool, sprint_id).await?;
    let active_blocker_count = active_blocker_count(pool, sprint_id).await?;
    debug!(sprint_id, total = counts.total, active_blocker_count, "loaded sprint snapshot");

    Ok(SprintSnapshot {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        total_tasks: counts.total,
        completed_tasks: counts.completed,
        in_progress_tasks: counts.in_progress,
        todo_tasks: counts.todo,
        unassigned_open_tasks: counts.unassigned_open,
        active_blocker_count,
    })
}

/// Signals for every open task in the sprint.
pub async fn fetch_task_signals(pool: &PgPool, sprint_id: i64) -> Result<Vec<TaskSignal>> {
    ensure_sprint(pool, sprint_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT t.id, t.title, t.status, t.assignee_id, t.story_points,
               t.created_at, t.started_at, s.end_date AS sprint_end_date,
               (SELECT COUNT(*) FROM blockers b
                 WHERE b.task_id = t.id AND b.status <> 'Resolved') AS active_blockers
        FROM sprint_tasks t
        JOIN sprints s ON s.id = t.sprint_id
        WHERE t.sprint_id = $1 AND t.status <> 'Done'
        ORDER BY t.id
        "#,
    )
    .bind(sprint_id)
    .fetch_all(pool)
    .await?;

    let mut signals = Vec::with_capacity(rows.len());
    for row in rows {
        let story_points: i32 = row.try_get("story_points")?;
        signals.push(TaskSignal {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            status: task_status(&row)?,
            assignee_id: row.try_get("assignee_id")?,
            story_points: story_points.max(0) as u32,
            created_at: row.try_get("created_at")?,
            started_at: row.try_get("started_at")?,
            active_blocker_count: count(&row, "active_blockers")?,
            sprint_end_date: row.try_get("sprint_end_date")?,
        });
    }

    debug!(sprint_id, open_tasks = signals.len(), "loaded task signals");
    Ok(signals)
}

pub async fn fetch_team_snapshot(
    pool: &PgPool,
    team_id: i64,
    now: DateTime<Utc>,
) -> Result<TeamSnapshot> {
    let team = sqlx::query("SELECT id, name FROM teams WHERE id = $1")
        .bind(team_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::TeamNotFound(team_id))?;

    let member_ids = team_member_ids(pool, team_id).await?;

    let active_sprint = match active_sprint_id(pool, team_id).await? {
        Some(sprint_id) => Some(active_sprint_stats(pool, sprint_id, &member_ids).await?),
        None => None,
    };

    let previous_rows = sqlx::query(
        r#"
        SELECT s.id, s.end_date,
               COUNT(t.id) AS total,
               COUNT(t.id) FILTER (WHERE t.status = 'Done') AS completed
        FROM sprints s
        LEFT JOIN sprint_tasks t ON t.sprint_id = s.id
        WHERE s.team_id = $1 AND s.status = 'Completed'
        GROUP BY s.id, s.end_date
        ORDER BY s.end_date DESC
        LIMIT 3
        "#,
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    let mut previous_sprints = Vec::with_capacity(previous_rows.len());
    for row in previous_rows {
        previous_sprints.push(CompletedSprintStats {
            sprint_id: row.try_get("id")?,
            end_date: row.try_get("end_date")?,
            total_tasks: count(&row, "total")?,
            completed_tasks: count(&row, "completed")?,
        });
    }

    let mood_rows = sqlx::query(
        r#"
        SELECT ds.date, ds.mood
        FROM daily_standups ds
        JOIN sprints s ON s.id = ds.sprint_id
        WHERE s.team_id = $1 AND ds.date >= $2 AND ds.mood IS NOT NULL
        "#,
    )
    .bind(team_id)
    .bind(now - Duration::days(MOOD_WINDOW_DAYS))
    .fetch_all(pool)
    .await?;

    let mut recent_moods = Vec::with_capacity(mood_rows.len());
    for row in mood_rows {
        let mood: i32 = row.try_get("mood")?;
        recent_moods.push(MoodSample {
            recorded_at: row.try_get("date")?,
            mood: mood.clamp(1, 5) as u8,
        });
    }

    debug!(
        team_id,
        members = member_ids.len(),
        has_active_sprint = active_sprint.is_some(),
        moods = recent_moods.len(),
        "loaded team snapshot"
    );

    Ok(TeamSnapshot {
        id: team.try_get("id")?,
        name: team.try_get("name")?,
        member_ids,
        active_sprint,
        previous_sprints,
        recent_moods,
    })
}

async fn active_sprint_stats(
    pool: &PgPool,
    sprint_id: i64,
    member_ids: &[i64],
) -> Result<ActiveSprintStats> {
    let counts = task_counts(pool, sprint_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT assignee_id, COUNT(*) AS assigned
        FROM sprint_tasks
        WHERE sprint_id = $1 AND assignee_id IS NOT NULL
        GROUP BY assignee_id
        "#,
    )
    .bind(sprint_id)
    .fetch_all(pool)
    .await?;

    let mut assigned: HashMap<i64, u32> = HashMap::new();
    for row in rows {
        assigned.insert(row.try_get("assignee_id")?, count(&row, "assigned")?);
    }

    Ok(ActiveSprintStats {
        sprint_id,
        total_tasks: counts.total,
        completed_tasks: counts.completed,
        tasks_per_member: member_ids
            .iter()
            .map(|id| assigned.get(id).copied().unwrap_or(0))
            .collect(),
        active_blocker_count: active_blocker_count(pool, sprint_id).await?,
    })
}

pub async fn fetch_standup_entries(
    pool: &PgPool,
    sprint_id: i64,
    date: NaiveDate,
) -> Result<Vec<StandupEntry>> {
    ensure_sprint(pool, sprint_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT COALESCE(u.full_name, u.email) AS user_name,
               ds.yesterday, ds.today, ds.blockers, ds.mood, ds.confidence
        FROM daily_standups ds
        JOIN users u ON u.id = ds.user_id
        WHERE ds.sprint_id = $1 AND ds.date::date = $2
        ORDER BY ds.submitted_at
        "#,
    )
    .bind(sprint_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let mood: Option<i32> = row.try_get("mood")?;
        let confidence: Option<i32> = row.try_get("confidence")?;
        entries.push(StandupEntry {
            user_name: row.try_get("user_name")?,
            yesterday: row.try_get("yesterday")?,
            today: row.try_get("today")?,
            blockers: row.try_get("blockers")?,
            mood: mood.map(|m| m.clamp(1, 5) as u8),
            confidence: confidence.map(|c| c.clamp(1, 5) as u8),
        });
    }

    Ok(entries)
}

/// Per-member tasks and open blockers in the team's active sprint, members in
/// user id order. Fails with `NoActiveSprint` when the team has none running.
pub async fn fetch_member_work(pool: &PgPool, team_id: i64) -> Result<Vec<MemberWork>> {
    sqlx::query("SELECT id FROM teams WHERE id = $1")
        .bind(team_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::TeamNotFound(team_id))?;
    let sprint_id = active_sprint_id(pool, team_id)
        .await?
        .ok_or(Error::NoActiveSprint(team_id))?;
    debug!(team_id, sprint_id, "building standup digest from active sprint");

    let member_rows = sqlx::query(
        r#"
        SELECT m.user_id, COALESCE(u.full_name, u.email) AS user_name
        FROM team_members m
        JOIN users u ON u.id = m.user_id
        WHERE m.team_id = $1
        ORDER BY m.user_id
        "#,
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    let task_rows = sqlx::query(
        r#"
        SELECT t.id, t.assignee_id, t.title, t.status, t.completed_at
        FROM sprint_tasks t
        WHERE t.sprint_id = $1 AND t.assignee_id IS NOT NULL
        ORDER BY t.order_index, t.id
        "#,
    )
    .bind(sprint_id)
    .fetch_all(pool)
    .await?;

    let blocker_rows = sqlx::query(
        r#"
        SELECT b.id, b.task_id, b.description, b.severity
        FROM blockers b
        JOIN sprint_tasks t ON t.id = b.task_id
        WHERE t.sprint_id = $1 AND b.status <> 'Resolved'
        ORDER BY b.id
        "#,
    )
    .bind(sprint_id)
    .fetch_all(pool)
    .await?;

    let mut blockers_by_task: HashMap<i64, Vec<BlockerNote>> = HashMap::new();
    for row in blocker_rows {
        let severity: String = row.try_get("severity")?;
        let severity = BlockerSeverity::parse(&severity).ok_or(Error::UnknownStatus {
            column: "blockers.severity",
            value: severity,
        })?;
        blockers_by_task
            .entry(row.try_get("task_id")?)
            .or_default()
            .push(BlockerNote {
                id: row.try_get("id")?,
                description: row.try_get("description")?,
                severity,
            });
    }

    let mut tasks_by_member: HashMap<i64, Vec<MemberTask>> = HashMap::new();
    for row in task_rows {
        let task_id: i64 = row.try_get("id")?;
        tasks_by_member
            .entry(row.try_get("assignee_id")?)
            .or_default()
            .push(MemberTask {
                title: row.try_get("title")?,
                status: task_status(&row)?,
                completed_at: row.try_get("completed_at")?,
                open_blockers: blockers_by_task.remove(&task_id).unwrap_or_default(),
            });
    }

    let mut members = Vec::with_capacity(member_rows.len());
    for row in member_rows {
        let user_id: i64 = row.try_get("user_id")?;
        members.push(MemberWork {
            user_id,
            user_name: row.try_get("user_name")?,
            tasks: tasks_by_member.remove(&user_id).unwrap_or_default(),
        });
    }

    Ok(members)
}

pub async fn fetch_task_outcomes(pool: &PgPool, sprint_id: i64) -> Result<Vec<TaskOutcome>> {
    ensure_sprint(pool, sprint_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT COALESCE(u.full_name, u.email) AS assignee_name, t.status
        FROM sprint_tasks t
        LEFT JOIN users u ON u.id = t.assignee_id
        WHERE t.sprint_id = $1
        ORDER BY t.id
        "#,
    )
    .bind(sprint_id)
    .fetch_all(pool)
    .await?;

    let mut outcomes = Vec::with_capacity(rows.len());
    for row in rows {
        outcomes.push(TaskOutcome {
            assignee_name: row.try_get("assignee_name")?,
            status: task_status(&row)?,
        });
    }
    Ok(outcomes)
}

/// Latest-started Active sprint of the team, if any.
async fn active_sprint_id(pool: &PgPool, team_id: i64) -> Result<Option<i64>> {
    let id: Option<i64> = sqlx::query(
        r#"
        SELECT id FROM sprints
        WHERE team_id = $1 AND status = 'Active'
        ORDER BY start_date DESC
        LIMIT 1
        "#,
    )
    .bind(team_id)
    .fetch_optional(pool)
    .await?
    .map(|row| row.try_get("id"))
    .transpose()?;
    Ok(id)
}

async fn ensure_sprint(pool: &PgPool, sprint_id: i64) -> Result<()> {
    sqlx::query("SELECT id FROM sprints WHERE id = $1")
        .bind(sprint_id)
        .fetch_optional(pool)
        .await?
        .map(|_| ())
        .ok_or(Error::SprintNotFound(sprint_id))
}

async fn team_member_ids(pool: &PgPool, team_id: i64) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT user_id FROM team_members WHERE team_id = $1 ORDER BY user_id")
        .bind(team_id)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| row.try_get("user_id").map_err(Error::from))
        .collect()
}

fn task_status(row: &PgRow) -> Result<TaskStatus> {
    let raw: String = row.try_get("status")?;
    TaskStatus::parse(&raw).ok_or(Error::UnknownStatus {
        column: "sprint_tasks.status",
        value: raw,
    })
}

fn count(row: &PgRow, column: &str) -> Result<u32> {
    let value: i64 = row.try_get(column)?;
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}
