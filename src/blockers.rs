use chrono::{DateTime, Utc};

use crate::models::{BlockerPrediction, TaskSignal, TaskStatus};
use crate::risk::fractional_days;

pub const REPORT_THRESHOLD: u8 = 50;

const STALE_AFTER_DAYS: f64 = 3.0;
const COMPLEX_STORY_POINTS: u32 = 8;

/// Predicts which open tasks are likely to become blocked.
///
/// Done tasks are skipped. Only tasks at or above [`REPORT_THRESHOLD`] are
/// returned, highest probability first; equal probabilities keep input order.
pub fn predict_blockers(tasks: &[TaskSignal], now: DateTime<Utc>) -> Vec<BlockerPrediction> {
    let mut predictions: Vec<BlockerPrediction> = tasks
        .iter()
        .filter(|task| task.status != TaskStatus::Done)
        .map(|task| score_task(task, now))
        .filter(|prediction| prediction.probability >= REPORT_THRESHOLD)
        .collect();

    predictions.sort_by(|a, b| b.probability.cmp(&a.probability));
    predictions
}

/// Scores a single task regardless of the reporting threshold.
pub fn score_task(task: &TaskSignal, now: DateTime<Utc>) -> BlockerPrediction {
    let mut points: u32 = 0;
    let mut reasons = Vec::new();
    let mut actions = Vec::new();

    let last_touched = task.started_at.unwrap_or(task.created_at);
    let idle_days = fractional_days(now - last_touched);
    if task.status == TaskStatus::InProgress && idle_days > STALE_AFTER_DAYS {
        points += 40;
        reasons.push(format!("Task hasn't been updated in {idle_days:.0} days"));
        actions.push("Check in with assignee about progress".to_string());
    }

    if task.assignee_id.is_none() {
        points += 30;
        reasons.push("Task is unassigned".to_string());
        actions.push("Assign task to a team member immediately".to_string());
    }

    if task.story_points > COMPLEX_STORY_POINTS {
        points += 20;
        reasons.push(format!(
            "High complexity task ({} story points)",
            task.story_points
        ));
        actions.push("Consider breaking down into smaller subtasks".to_string());
    }

    if task.active_blocker_count > 0 {
        points += 30;
        reasons.push(format!(
            "Already has {} active blocker(s)",
            task.active_blocker_count
        ));
        actions.push("Escalate existing blockers for resolution".to_string());
    }

    if task.sprint_end_date < now {
        points += 25;
        reasons.push("Task is past sprint end date".to_string());
        actions.push("Re-prioritize or move to next sprint".to_string());
    }

    BlockerPrediction {
        task_id: task.id,
        task_title: task.title.clone(),
        probability: points.min(100) as u8,
        reasons,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn sample_task(id: i64) -> TaskSignal {
        TaskSignal {
            id,
            title: format!("Task {id}"),
            status: TaskStatus::Todo,
            assignee_id: Some(11),
            story_points: 3,
            created_at: now() - Duration::days(1),
            started_at: None,
            active_blocker_count: 0,
            sprint_end_date: now() + Duration::days(4),
        }
    }

    #[test]
    fn unassigned_complex_task_hits_threshold_exactly() {
        let mut task = sample_task(1);
        task.assignee_id = None;
        task.story_points = 10;

        let predictions = predict_blockers(&[task], now());
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].probability, 50);
        assert_eq!(
            predictions[0].reasons,
            vec![
                "Task is unassigned".to_string(),
                "High complexity task (10 story points)".to_string()
            ]
        );
        assert_eq!(predictions[0].actions.len(), 2);
    }

    #[test]
    fn below_threshold_is_dropped() {
        let mut task = sample_task(2);
        task.active_blocker_count = 1;
        task.story_points = 8;
        assert_eq!(score_task(&task, now()).probability, 30);
        assert!(predict_blockers(&[task], now()).is_empty());
    }

    #[test]
    fn stale_in_progress_task_is_flagged() {
        let mut task = sample_task(3);
        task.status = TaskStatus::InProgress;
        task.started_at = Some(now() - Duration::days(5));
        task.active_blocker_count = 2;

        let prediction = score_task(&task, now());
        assert_eq!(prediction.probability, 70);
        assert_eq!(prediction.reasons[0], "Task hasn't been updated in 5 days");
        assert_eq!(prediction.reasons[1], "Already has 2 active blocker(s)");
    }

    #[test]
    fn stale_todo_task_is_not_counted_as_stuck() {
        let mut task = sample_task(4);
        task.created_at = now() - Duration::days(9);
        assert_eq!(score_task(&task, now()).probability, 0);
    }

    #[test]
    fn everything_at_once_clamps_to_100() {
        let task = TaskSignal {
            status: TaskStatus::InProgress,
            assignee_id: None,
            story_points: 21,
            started_at: Some(now() - Duration::days(6)),
            active_blocker_count: 3,
            sprint_end_date: now() - Duration::days(1),
            ..sample_task(5)
        };
        let prediction = score_task(&task, now());
        assert_eq!(prediction.probability, 100);
        assert_eq!(prediction.reasons.len(), 5);
        assert_eq!(prediction.reasons[4], "Task is past sprint end date");
    }

    #[test]
    fn done_tasks_are_skipped() {
        let task = TaskSignal {
            status: TaskStatus::Done,
            assignee_id: None,
            story_points: 13,
            ..sample_task(6)
        };
        assert!(predict_blockers(&[task], now()).is_empty());
    }

    #[test]
    fn ordering_is_descending_and_stable_on_ties() {
        let mut low_a = sample_task(10);
        low_a.assignee_id = None;
        low_a.story_points = 9;
        let mut high = sample_task(11);
        high.assignee_id = None;
        high.active_blocker_count = 1;
        let mut low_b = sample_task(12);
        low_b.assignee_id = None;
        low_b.story_points = 20;

        let ids: Vec<i64> = predict_blockers(&[low_a, high, low_b], now())
            .iter()
            .map(|p| p.task_id)
            .collect();
        assert_eq!(ids, vec![11, 10, 12]);
    }

    #[test]
    fn adding_a_blocker_never_lowers_probability() {
        let mut task = sample_task(13);
        task.assignee_id = None;
        let before = score_task(&task, now()).probability;
        task.active_blocker_count = 1;
        let after = score_task(&task, now()).probability;
        assert!(after >= before);
    }
}
