use chrono::{DateTime, Duration, Utc};

use crate::models::{
    ActiveSprintStats, CompletedSprintStats, Insight, InsightKind, Severity, TeamHealth,
    TeamSnapshot,
};
use crate::risk::percentage;

pub const MOOD_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_MORALE: f64 = 70.0;
pub const PLACEHOLDER_OVERALL: f64 = 75.0;

const VELOCITY_HISTORY: usize = 3;

/// Source of the collaboration sub-score.
pub trait CollaborationSignal {
    fn score(&self, team: &TeamSnapshot, now: DateTime<Utc>) -> f64;
}

/// Constant collaboration score, used until a real signal is wired in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCollaboration(pub f64);

impl Default for FixedCollaboration {
    fn default() -> Self {
        Self(75.0)
    }
}

impl CollaborationSignal for FixedCollaboration {
    fn score(&self, _team: &TeamSnapshot, _now: DateTime<Utc>) -> f64 {
        self.0
    }
}

pub fn score_team_health(team: &TeamSnapshot, now: DateTime<Utc>) -> TeamHealth {
    score_team_health_with(team, now, &FixedCollaboration::default())
}

/// Scores a resolved team snapshot. A team without an active sprint gets the
/// fixed placeholder result rather than an error.
pub fn score_team_health_with(
    team: &TeamSnapshot,
    now: DateTime<Utc>,
    collaboration: &dyn CollaborationSignal,
) -> TeamHealth {
    let Some(active) = team.active_sprint.as_ref() else {
        return placeholder(team);
    };

    let workload_balance = workload_balance(&active.tasks_per_member);
    let velocity_trend = velocity_trend(active, &team.previous_sprints);
    let morale = morale_score(team, now);
    let collaboration = collaboration.score(team, now).clamp(0.0, 100.0);
    let active_blockers = active.active_blocker_count;

    let burnout_risk = burnout_risk(active_blockers, workload_balance, morale, velocity_trend);
    let overall = (morale + workload_balance + collaboration + (100.0 - burnout_risk).max(0.0)) / 4.0;

    let mut insights = Vec::new();
    if overall >= 80.0 {
        insights.push(insight(
            InsightKind::Praise,
            "Team is performing excellently! Keep up the great work.".to_string(),
            Severity::Info,
        ));
    }
    if workload_balance < 70.0 {
        insights.push(insight(
            InsightKind::WorkloadImbalance,
            "Work distribution is uneven. Consider rebalancing tasks.".to_string(),
            Severity::Warning,
        ));
    }
    if active_blockers > 3 {
        insights.push(insight(
            InsightKind::BlockerAlert,
            format!("{active_blockers} active blockers detected. Prioritize resolution."),
            Severity::Critical,
        ));
    }
    if morale < 60.0 {
        insights.push(insight(
            InsightKind::MoraleConcern,
            "Team morale is below target. Schedule a team check-in.".to_string(),
            Severity::Warning,
        ));
    }
    if velocity_trend < -15.0 {
        insights.push(insight(
            InsightKind::VelocityDrop,
            format!(
                "Velocity decreased by {:.0}%. Investigate root causes.",
                velocity_trend.abs()
            ),
            Severity::Warning,
        ));
    }

    TeamHealth {
        team_id: team.id,
        team_name: team.name.clone(),
        overall: overall.clamp(0.0, 100.0),
        morale,
        workload_balance,
        collaboration,
        burnout_risk,
        active_blockers,
        velocity_trend,
        insights,
    }
}

fn placeholder(team: &TeamSnapshot) -> TeamHealth {
    TeamHealth {
        team_id: team.id,
        team_name: team.name.clone(),
        overall: PLACEHOLDER_OVERALL,
        morale: 0.0,
        workload_balance: 0.0,
        collaboration: 0.0,
        burnout_risk: 0.0,
        active_blockers: 0,
        velocity_trend: 0.0,
        insights: vec![insight(
            InsightKind::Info,
            "No active sprint to analyze".to_string(),
            Severity::Info,
        )],
    }
}

/// 100 while the busiest member is within two tasks of the mean, then ten
/// points off per task of deviation (truncated), floored at 0.
pub fn workload_balance(tasks_per_member: &[u32]) -> f64 {
    let Some(max) = tasks_per_member.iter().max() else {
        return 100.0;
    };
    let mean = tasks_per_member.iter().map(|&n| f64::from(n)).sum::<f64>()
        / tasks_per_member.len() as f64;
    let max_deviation = f64::from(*max) - mean;

    if max_deviation <= 2.0 {
        100.0
    } else {
        (100.0 - (max_deviation * 10.0).trunc()).max(0.0)
    }
}

/// Signed percent change of the active sprint's completion rate against the
/// mean of the most recent completed sprints.
pub fn velocity_trend(active: &ActiveSprintStats, previous: &[CompletedSprintStats]) -> f64 {
    if previous.is_empty() {
        return 0.0;
    }

    let mut recent: Vec<&CompletedSprintStats> = previous.iter().collect();
    recent.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    recent.truncate(VELOCITY_HISTORY);

    let average = recent
        .iter()
        .map(|sprint| percentage(sprint.completed_tasks, sprint.total_tasks))
        .sum::<f64>()
        / recent.len() as f64;
    let current = percentage(active.completed_tasks, active.total_tasks);

    if average > 0.0 {
        (current - average) / average * 100.0
    } else {
        0.0
    }
}

pub fn morale_score(team: &TeamSnapshot, now: DateTime<Utc>) -> f64 {
    let cutoff = now - Duration::days(MOOD_WINDOW_DAYS);
    let moods: Vec<f64> = team
        .recent_moods
        .iter()
        .filter(|sample| sample.recorded_at >= cutoff)
        .map(|sample| f64::from(sample.mood.clamp(1, 5)))
        .collect();

    if moods.is_empty() {
        DEFAULT_MORALE
    } else {
        moods.iter().sum::<f64>() / moods.len() as f64 * 20.0
    }
}

/// Additive penalties. The sum is not clamped; only the
/// overall score floors `100 - burnout` at zero.
pub fn burnout_risk(active_blockers: u32, workload_balance: f64, morale: f64, velocity_trend: f64) -> f64 {
    let mut risk = 0.0;
    if active_blockers > 5 {
        risk += 30.0;
    }
    if workload_balance < 60.0 {
        risk += 25.0;
    }
    if morale < 50.0 {
        risk += 25.0;
    }
    if velocity_trend < -20.0 {
        risk += 20.0;
    }
    risk
}

fn insight(kind: InsightKind, message: String, severity: Severity) -> Insight {
    Insight {
        kind,
        message,
        severity,
    }
}
