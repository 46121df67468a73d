use chrono::{DateTime, Duration, Utc};

use crate::models::{RiskAssessment, RiskLevel, SprintSnapshot};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Scores delivery risk for a resolved sprint snapshot.
///
/// The snapshot must describe a sprint that exists; callers translate a
/// missing sprint into their own not-found error before getting here.
pub fn assess_risk(snapshot: &SprintSnapshot, now: DateTime<Utc>) -> RiskAssessment {
    let days_total = fractional_days(snapshot.end_date - snapshot.start_date);
    let days_elapsed = fractional_days(now - snapshot.start_date);
    let days_remaining = fractional_days(snapshot.end_date - now);

    let expected_progress = if days_total > 0.0 {
        (days_elapsed / days_total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let completion = percentage(snapshot.completed_tasks, snapshot.total_tasks);

    let mut factors = Vec::new();
    let mut recommendations = Vec::new();

    let severely_behind = completion < expected_progress - 20.0;
    let slightly_behind = completion < expected_progress - 10.0;

    if severely_behind {
        factors.push(format!(
            "Significantly behind schedule: {completion:.0}% complete vs {expected_progress:.0}% time elapsed"
        ));
        recommendations.push("Consider descoping non-critical tasks".to_string());
        recommendations.push("Schedule team capacity review meeting".to_string());
    } else if slightly_behind {
        factors.push(format!(
            "Slightly behind schedule: {completion:.0}% complete vs {expected_progress:.0}% time elapsed"
        ));
        recommendations.push("Monitor daily progress closely".to_string());
    }

    let open_tasks = f64::from(snapshot.todo_tasks) + f64::from(snapshot.in_progress_tasks);
    let tasks_per_day = if days_remaining > 0.0 {
        open_tasks / days_remaining
    } else {
        0.0
    };
    if tasks_per_day > 3.0 {
        factors.push(format!(
            "High remaining workload: {tasks_per_day:.1} tasks per day needed"
        ));
        recommendations.push("Consider extending sprint or reducing scope".to_string());
    }

    if snapshot.active_blocker_count > 0 {
        factors.push(format!(
            "{} active blocker(s) detected",
            snapshot.active_blocker_count
        ));
        recommendations.push("Prioritize blocker resolution immediately".to_string());
    }

    if snapshot.unassigned_open_tasks > 0 {
        factors.push(format!(
            "{} task(s) are unassigned",
            snapshot.unassigned_open_tasks
        ));
        recommendations.push("Assign all tasks to team members".to_string());
    }

    let (level, probability) = if factors.len() >= 3 || severely_behind {
        (RiskLevel::Critical, completion.max(30.0))
    } else if factors.len() == 2 || slightly_behind {
        (RiskLevel::High, completion.max(50.0))
    } else if factors.len() == 1 {
        (RiskLevel::Medium, completion.max(70.0))
    } else {
        recommendations.push("Sprint is on track - maintain current momentum".to_string());
        (RiskLevel::Low, completion.max(75.0).min(95.0))
    };
    let probability = probability.clamp(0.0, 100.0);

    RiskAssessment {
        sprint_id: snapshot.id,
        sprint_name: snapshot.name.clone(),
        level,
        completion_probability: probability,
        predicted_unfinished_tasks: predicted_unfinished(probability, snapshot.total_tasks),
        factors,
        recommendations,
    }
}

pub fn predicted_unfinished(probability: f64, total_tasks: u32) -> u32 {
    let missing = 100.0 - probability.clamp(0.0, 100.0);
    (missing * f64::from(total_tasks) / 100.0).ceil().max(0.0) as u32
}

pub(crate) fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

pub(crate) fn fractional_days(span: Duration) -> f64 {
    span.num_seconds() as f64 / SECONDS_PER_DAY
}
