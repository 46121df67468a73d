use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::test_runner::Config;

use sprintiq_heuristics::blockers::{score_task, REPORT_THRESHOLD};
use sprintiq_heuristics::models::{
    ActiveSprintStats, CompletedSprintStats, MoodSample, SprintSnapshot, TaskSignal, TaskStatus,
    TeamSnapshot,
};
use sprintiq_heuristics::{assess_risk, predict_blockers, score_team_health, suggest};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
}

fn status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::InReview),
        Just(TaskStatus::Done),
    ]
}

fn sprint() -> impl Strategy<Value = SprintSnapshot> {
    (0_u32..200, 0_i64..30, 0_u32..20, 0_u32..20)
        .prop_flat_map(|(total, length_days, blockers, unassigned)| {
            (0..=total, 0..=total, Just((total, length_days, blockers, unassigned)))
        })
        .prop_map(|(completed, open, (total, length_days, blockers, unassigned))| {
            let remaining = total - completed;
            let in_progress = open.min(remaining);
            SprintSnapshot {
                id: 1,
                name: "Sprint".to_string(),
                start_date: epoch(),
                end_date: epoch() + Duration::days(length_days),
                total_tasks: total,
                completed_tasks: completed,
                in_progress_tasks: in_progress,
                todo_tasks: remaining - in_progress,
                unassigned_open_tasks: unassigned.min(remaining),
                active_blocker_count: blockers,
            }
        })
}

fn task() -> impl Strategy<Value = TaskSignal> {
    (
        1_i64..10_000,
        status(),
        proptest::option::of(1_i64..50),
        0_u32..30,
        0_i64..40,
        proptest::option::of(0_i64..40),
        0_u32..5,
        -10_i64..20,
    )
        .prop_map(
            |(id, status, assignee_id, story_points, created_ago, started_ago, blockers, end_in)| {
                let now = epoch() + Duration::days(60);
                TaskSignal {
                    id,
                    title: format!("Task {id}"),
                    status,
                    assignee_id,
                    story_points,
                    created_at: now - Duration::days(created_ago),
                    started_at: started_ago.map(|days| now - Duration::days(days)),
                    active_blocker_count: blockers,
                    sprint_end_date: now + Duration::days(end_in),
                }
            },
        )
}

fn team() -> impl Strategy<Value = TeamSnapshot> {
    (
        proptest::collection::vec(0_u32..40, 0..8),
        0_u32..100,
        0_u32..100,
        0_u32..12,
        proptest::collection::vec((1_i64..90, 0_u32..50, 0_u32..50), 0..5),
        proptest::collection::vec((0_i64..14, 0_u8..8), 0..10),
    )
        .prop_map(|(per_member, total, completed, blockers, history, moods)| {
            let now = epoch() + Duration::days(60);
            TeamSnapshot {
                id: 9,
                name: "Team".to_string(),
                member_ids: (0..per_member.len() as i64).collect(),
                active_sprint: Some(ActiveSprintStats {
                    sprint_id: 100,
                    total_tasks: total,
                    completed_tasks: completed.min(total),
                    tasks_per_member: per_member,
                    active_blocker_count: blockers,
                }),
                previous_sprints: history
                    .into_iter()
                    .enumerate()
                    .map(|(i, (ago, total, done))| CompletedSprintStats {
                        sprint_id: i as i64,
                        end_date: now - Duration::days(ago),
                        total_tasks: total,
                        completed_tasks: done.min(total),
                    })
                    .collect(),
                recent_moods: moods
                    .into_iter()
                    .map(|(ago, mood)| MoodSample {
                        recorded_at: now - Duration::days(ago),
                        mood,
                    })
                    .collect(),
            }
        })
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn risk_probability_stays_in_range(snapshot in sprint(), elapsed in -5_i64..40) {
        let now = epoch() + Duration::days(elapsed);
        let assessment = assess_risk(&snapshot, now);
        prop_assert!((0.0..=100.0).contains(&assessment.completion_probability));
        prop_assert!(assessment.predicted_unfinished_tasks <= snapshot.total_tasks);
        prop_assert_eq!(assessment.clone(), assess_risk(&snapshot, now));
    }

    #[test]
    fn empty_sprint_never_predicts_unfinished(snapshot in sprint(), elapsed in -5_i64..40) {
        let empty = SprintSnapshot {
            total_tasks: 0,
            completed_tasks: 0,
            in_progress_tasks: 0,
            todo_tasks: 0,
            unassigned_open_tasks: 0,
            ..snapshot
        };
        let assessment = assess_risk(&empty, epoch() + Duration::days(elapsed));
        prop_assert_eq!(assessment.predicted_unfinished_tasks, 0);
    }

    #[test]
    fn blocker_predictions_respect_threshold_and_order(tasks in proptest::collection::vec(task(), 0..20)) {
        let now = epoch() + Duration::days(60);
        let predictions = predict_blockers(&tasks, now);

        for prediction in &predictions {
            prop_assert!(prediction.probability >= REPORT_THRESHOLD);
            prop_assert!(prediction.probability <= 100);
        }
        for pair in predictions.windows(2) {
            prop_assert!(pair[0].probability >= pair[1].probability);
        }
        let open_flagged = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Done)
            .filter(|t| score_task(t, now).probability >= REPORT_THRESHOLD)
            .count();
        prop_assert_eq!(predictions.len(), open_flagged);
        prop_assert_eq!(predictions, predict_blockers(&tasks, now));
    }

    #[test]
    fn first_blocker_never_lowers_probability(signal in task()) {
        let now = epoch() + Duration::days(60);
        let clean = TaskSignal { active_blocker_count: 0, ..signal.clone() };
        let blocked = TaskSignal { active_blocker_count: 1, ..signal };
        prop_assert!(score_task(&blocked, now).probability >= score_task(&clean, now).probability);
    }

    #[test]
    fn team_scores_stay_in_range(snapshot in team()) {
        let now = epoch() + Duration::days(60);
        let health = score_team_health(&snapshot, now);

        for score in [health.overall, health.morale, health.workload_balance, health.collaboration] {
            prop_assert!((0.0..=100.0).contains(&score));
        }
        prop_assert!(health.burnout_risk >= 0.0);
        let floored = (100.0 - health.burnout_risk).max(0.0);
        let expected = (health.morale + health.workload_balance + health.collaboration + floored) / 4.0;
        prop_assert!((health.overall - expected).abs() < 1e-9);
        prop_assert_eq!(health, score_team_health(&snapshot, now));
    }

    #[test]
    fn suggestions_are_never_empty(text in "\\PC{0,80}") {
        let bullets = suggest(&text);
        prop_assert!(bullets.len() >= 3);
        prop_assert_eq!(bullets, suggest(&text));
    }
}
