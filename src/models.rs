use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Todo" => Some(TaskStatus::Todo),
            "InProgress" => Some(TaskStatus::InProgress),
            "InReview" => Some(TaskStatus::InReview),
            "Done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockerSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BlockerSeverity {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(BlockerSeverity::Low),
            "Medium" => Some(BlockerSeverity::Medium),
            "High" => Some(BlockerSeverity::High),
            "Critical" => Some(BlockerSeverity::Critical),
            _ => None,
        }
    }
}

/// Aggregate view of one sprint, materialized by the caller before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintSnapshot {
    pub id: i64,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub todo_tasks: u32,
    pub unassigned_open_tasks: u32,
    pub active_blocker_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSignal {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub assignee_id: Option<i64>,
    pub story_points: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub active_blocker_count: u32,
    pub sprint_end_date: DateTime<Utc>,
}

/// Team-level aggregates. `tasks_per_member` inside the active sprint lines
/// up index-for-index with `member_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub id: i64,
    pub name: String,
    pub member_ids: Vec<i64>,
    pub active_sprint: Option<ActiveSprintStats>,
    #[serde(default)]
    pub previous_sprints: Vec<CompletedSprintStats>,
    #[serde(default)]
    pub recent_moods: Vec<MoodSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSprintStats {
    pub sprint_id: i64,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub tasks_per_member: Vec<u32>,
    pub active_blocker_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSprintStats {
    pub sprint_id: i64,
    pub end_date: DateTime<Utc>,
    pub total_tasks: u32,
    pub completed_tasks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    pub recorded_at: DateTime<Utc>,
    pub mood: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub sprint_id: i64,
    pub sprint_name: String,
    pub level: RiskLevel,
    pub completion_probability: f64,
    pub predicted_unfinished_tasks: u32,
    pub factors: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerPrediction {
    pub task_id: i64,
    pub task_title: String,
    pub probability: u8,
    pub reasons: Vec<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightKind {
    Info,
    Praise,
    WorkloadImbalance,
    BlockerAlert,
    MoraleConcern,
    VelocityDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    pub severity: Severity,
}

/// `burnout_risk` is the raw penalty sum and may exceed 100; `velocity_trend`
/// is a signed percentage. Every other score sits in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamHealth {
    pub team_id: i64,
    pub team_name: String,
    pub overall: f64,
    pub morale: f64,
    pub workload_balance: f64,
    pub collaboration: f64,
    pub burnout_risk: f64,
    pub active_blockers: u32,
    pub velocity_trend: f64,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupEntry {
    pub user_name: String,
    #[serde(default)]
    pub yesterday: Option<String>,
    #[serde(default)]
    pub today: Option<String>,
    #[serde(default)]
    pub blockers: Option<String>,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub confidence: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberWork {
    pub user_id: i64,
    pub user_name: String,
    pub tasks: Vec<MemberTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTask {
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub open_blockers: Vec<BlockerNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockerNote {
    pub id: i64,
    pub description: String,
    pub severity: BlockerSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub assignee_name: Option<String>,
    pub status: TaskStatus,
}
