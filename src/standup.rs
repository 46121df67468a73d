use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{BlockerNote, MemberWork, StandupEntry, TaskStatus};

const NEUTRAL_RATING: f64 = 3.0;
const FOCUS_LIMIT: usize = 5;
const PLANNED_LIMIT: usize = 3;
const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoodBand {
    Great,
    Good,
    Okay,
    Low,
    Struggling,
}

impl MoodBand {
    pub fn from_average(mood: f64) -> Self {
        if mood >= 4.5 {
            MoodBand::Great
        } else if mood >= 3.5 {
            MoodBand::Good
        } else if mood >= 2.5 {
            MoodBand::Okay
        } else if mood >= 1.5 {
            MoodBand::Low
        } else {
            MoodBand::Struggling
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoodBand::Great => "🌟",
            MoodBand::Good => "😊",
            MoodBand::Okay => "😐",
            MoodBand::Low => "😟",
            MoodBand::Struggling => "😰",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupSummary {
    pub submissions: usize,
    pub average_mood: f64,
    pub average_confidence: f64,
    pub mood_band: MoodBand,
    /// (user, blocker text) for every entry that reported one.
    pub blockers: Vec<(String, String)>,
    pub focus: Vec<(String, String)>,
    pub recommendations: Vec<String>,
}

/// Rolls a day's standup entries into a summary; `None` when nobody submitted.
pub fn summarize_standups(entries: &[StandupEntry]) -> Option<StandupSummary> {
    if entries.is_empty() {
        return None;
    }

    let average_mood = average_rating(entries.iter().filter_map(|e| e.mood));
    let average_confidence = average_rating(entries.iter().filter_map(|e| e.confidence));

    let blockers: Vec<(String, String)> = entries
        .iter()
        .filter_map(|e| non_empty(&e.blockers).map(|b| (e.user_name.clone(), b.to_string())))
        .collect();
    let focus: Vec<(String, String)> = entries
        .iter()
        .filter_map(|e| non_empty(&e.today).map(|t| (e.user_name.clone(), t.to_string())))
        .take(FOCUS_LIMIT)
        .collect();

    let mut recommendations = Vec::new();
    if average_mood < 3.0 {
        recommendations
            .push("Team morale is low - consider a quick team sync or support session".to_string());
    }
    if average_confidence < 3.0 {
        recommendations.push("Sprint confidence is low - review scope and priorities".to_string());
    }
    if blockers.len() > 2 {
        recommendations
            .push("Multiple blockers reported - prioritize blocker resolution today".to_string());
    }

    Some(StandupSummary {
        submissions: entries.len(),
        average_mood,
        average_confidence,
        mood_band: MoodBand::from_average(average_mood),
        blockers,
        focus,
        recommendations,
    })
}

pub fn render_standup_summary(summary: Option<&StandupSummary>) -> String {
    let Some(summary) = summary else {
        return "No standups submitted yet for this period.".to_string();
    };

    let mut output = String::new();
    let _ = writeln!(output, "📊 **Daily Standup Summary**");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "**Participation:** {} team member(s) submitted updates",
        summary.submissions
    );
    let _ = writeln!(
        output,
        "**Team Mood:** {} {:.1}/5",
        summary.mood_band.emoji(),
        summary.average_mood
    );
    let _ = writeln!(
        output,
        "**Sprint Confidence:** {:.1}/5",
        summary.average_confidence
    );
    let _ = writeln!(output);

    if summary.blockers.is_empty() {
        let _ = writeln!(output, "✅ **No blockers reported** - Team is moving smoothly!");
    } else {
        let _ = writeln!(
            output,
            "⚠️ **Blockers Reported ({}):**",
            summary.blockers.len()
        );
        for (user, blocker) in &summary.blockers {
            let _ = writeln!(output, "• {user}: {blocker}");
        }
    }

    if !summary.focus.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "📋 **Today's Focus:**");
        for (user, plan) in &summary.focus {
            let _ = writeln!(output, "• {user}: {plan}");
        }
    }

    if !summary.recommendations.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "💡 **AI Recommendations:**");
        for recommendation in &summary.recommendations {
            let _ = writeln!(output, "• {recommendation}");
        }
    }

    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandupInsightKind {
    BlockerAlert,
    VelocityWarning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightPriority {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupInsight {
    pub kind: StandupInsightKind,
    pub title: String,
    pub description: String,
    pub priority: InsightPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub user_id: i64,
    pub user_name: String,
    pub completed_yesterday: Vec<String>,
    pub planned_today: Vec<String>,
    pub blockers: Vec<BlockerNote>,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartStandup {
    pub date: NaiveDate,
    pub members: Vec<MemberSummary>,
    pub insights: Vec<StandupInsight>,
    pub total_blockers: usize,
    pub tasks_completed: usize,
    pub tasks_in_progress: usize,
}

/// Builds the auto-generated standup for `date` from each member's work in
/// the active sprint.
pub fn smart_standup(members: &[MemberWork], date: NaiveDate) -> SmartStandup {
    let since = date - Duration::days(1);

    let summaries: Vec<MemberSummary> = members
        .iter()
        .map(|member| {
            let completed_yesterday: Vec<String> = member
                .tasks
                .iter()
                .filter(|task| task.status == TaskStatus::Done)
                .filter(|task| {
                    task.completed_at
                        .is_some_and(|at| at.date_naive() >= since)
                })
                .map(|task| task.title.clone())
                .collect();
            let planned_today: Vec<String> = member
                .tasks
                .iter()
                .filter(|task| task.status != TaskStatus::Done)
                .take(PLANNED_LIMIT)
                .map(|task| task.title.clone())
                .collect();
            let blockers: Vec<BlockerNote> = member
                .tasks
                .iter()
                .flat_map(|task| task.open_blockers.iter().cloned())
                .collect();

            let sentiment = if !blockers.is_empty() {
                Sentiment::Negative
            } else if !completed_yesterday.is_empty() {
                Sentiment::Positive
            } else {
                Sentiment::Neutral
            };

            MemberSummary {
                user_id: member.user_id,
                user_name: member.user_name.clone(),
                completed_yesterday,
                planned_today,
                blockers,
                sentiment,
            }
        })
        .collect();

    let total_blockers = summaries.iter().map(|m| m.blockers.len()).sum();
    let tasks_completed = summaries.iter().map(|m| m.completed_yesterday.len()).sum();
    let tasks_in_progress = summaries.iter().map(|m| m.planned_today.len()).sum();

    let mut insights = Vec::new();
    if total_blockers > 0 {
        insights.push(StandupInsight {
            kind: StandupInsightKind::BlockerAlert,
            title: "Active Blockers Detected".to_string(),
            description: format!("{total_blockers} blocker(s) need immediate attention"),
            priority: InsightPriority::High,
        });
    }
    if tasks_completed == 0 {
        insights.push(StandupInsight {
            kind: StandupInsightKind::VelocityWarning,
            title: "No Tasks Completed Yesterday".to_string(),
            description: "Team velocity may be slowing. Check for impediments.".to_string(),
            priority: InsightPriority::Medium,
        });
    }

    SmartStandup {
        date,
        members: summaries,
        insights,
        total_blockers,
        tasks_completed,
        tasks_in_progress,
    }
}

/// Ratings outside the 1-5 scale are clamped onto it.
fn average_rating(ratings: impl Iterator<Item = u8>) -> f64 {
    let values: Vec<f64> = ratings
        .map(|rating| f64::from(rating.clamp(MIN_RATING, MAX_RATING)))
        .collect();
    if values.is_empty() {
        NEUTRAL_RATING
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockerSeverity, MemberTask};
    use chrono::{TimeZone, Utc};

    fn entry(name: &str, mood: Option<u8>, blockers: Option<&str>) -> StandupEntry {
        StandupEntry {
            user_name: name.to_string(),
            yesterday: None,
            today: Some(format!("{name} ships the thing")),
            blockers: blockers.map(str::to_string),
            mood,
            confidence: Some(4),
        }
    }

    #[test]
    fn empty_standups_render_placeholder() {
        assert!(summarize_standups(&[]).is_none());
        assert_eq!(
            render_standup_summary(None),
            "No standups submitted yet for this period."
        );
    }

    #[test]
    fn missing_moods_default_to_neutral() {
        let summary = summarize_standups(&[entry("Ana", None, None)]).unwrap();
        assert_eq!(summary.average_mood, 3.0);
        assert_eq!(summary.mood_band, MoodBand::Okay);
        assert!(summary.recommendations.is_empty());
    }

    #[test]
    fn low_mood_and_many_blockers_are_recommended_on() {
        let entries = vec![
            entry("Ana", Some(2), Some("CI is red")),
            entry("Ben", Some(1), Some("Waiting on design")),
            entry("Cy", None, Some("VPN down")),
            entry("Di", Some(3), Some("")),
        ];
        let summary = summarize_standups(&entries).unwrap();

        assert_eq!(summary.submissions, 4);
        assert_eq!(summary.average_mood, 2.0);
        assert_eq!(summary.mood_band, MoodBand::Low);
        assert_eq!(summary.blockers.len(), 3);
        assert_eq!(summary.recommendations.len(), 2);

        let text = render_standup_summary(Some(&summary));
        assert!(text.contains("**Team Mood:** 😟 2.0/5"));
        assert!(text.contains("⚠️ **Blockers Reported (3):**"));
        assert!(text.contains("• Ben: Waiting on design"));
        assert!(text.contains("💡 **AI Recommendations:**"));
    }

    #[test]
    fn focus_list_is_capped() {
        let entries: Vec<StandupEntry> = (0..7)
            .map(|i| entry(&format!("user{i}"), Some(5), None))
            .collect();
        let summary = summarize_standups(&entries).unwrap();
        assert_eq!(summary.focus.len(), 5);
        assert_eq!(summary.mood_band, MoodBand::Great);
        assert!(render_standup_summary(Some(&summary)).contains("No blockers reported"));
    }

    #[test]
    fn out_of_scale_ratings_are_clamped() {
        let mut high = entry("Ana", Some(9), None);
        high.confidence = Some(0);
        let summary = summarize_standups(&[high, entry("Ben", Some(5), None)]).unwrap();

        assert_eq!(summary.average_mood, 5.0);
        assert_eq!(summary.average_confidence, 2.5);
        assert!(render_standup_summary(Some(&summary)).contains("**Team Mood:** 🌟 5.0/5"));
    }

    fn task(title: &str, status: TaskStatus, completed_day: Option<u32>) -> MemberTask {
        MemberTask {
            title: title.to_string(),
            status,
            completed_at: completed_day
                .map(|day| Utc.with_ymd_and_hms(2026, 5, day, 15, 0, 0).unwrap()),
            open_blockers: Vec::new(),
        }
    }

    #[test]
    fn smart_standup_groups_work_per_member() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 12).unwrap();
        let mut blocked = task("Wire SSO", TaskStatus::InProgress, None);
        blocked.open_blockers.push(BlockerNote {
            id: 4,
            description: "Waiting for IdP credentials".to_string(),
            severity: BlockerSeverity::High,
        });

        let members = vec![
            MemberWork {
                user_id: 1,
                user_name: "Ana".to_string(),
                tasks: vec![
                    task("Login page", TaskStatus::Done, Some(11)),
                    task("Old cleanup", TaskStatus::Done, Some(2)),
                    task("Reset flow", TaskStatus::Todo, None),
                ],
            },
            MemberWork {
                user_id: 2,
                user_name: "Ben".to_string(),
                tasks: vec![blocked],
            },
            MemberWork {
                user_id: 3,
                user_name: "Cy".to_string(),
                tasks: vec![],
            },
        ];

        let standup = smart_standup(&members, date);
        assert_eq!(standup.members[0].completed_yesterday, vec!["Login page".to_string()]);
        assert_eq!(standup.members[0].sentiment, Sentiment::Positive);
        assert_eq!(standup.members[1].sentiment, Sentiment::Negative);
        assert_eq!(standup.members[2].sentiment, Sentiment::Neutral);
        assert_eq!(standup.total_blockers, 1);
        assert_eq!(standup.tasks_completed, 1);
        assert_eq!(standup.tasks_in_progress, 2);
        assert_eq!(standup.insights.len(), 1);
        assert_eq!(standup.insights[0].kind, StandupInsightKind::BlockerAlert);
        assert_eq!(standup.insights[0].priority, InsightPriority::High);
    }

    #[test]
    fn smart_standup_without_completions_warns() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 12).unwrap();
        let members = vec![MemberWork {
            user_id: 1,
            user_name: "Ana".to_string(),
            tasks: vec![task("Reset flow", TaskStatus::Todo, None)],
        }];
        let standup = smart_standup(&members, date);
        assert_eq!(standup.insights.len(), 1);
        assert_eq!(standup.insights[0].kind, StandupInsightKind::VelocityWarning);
    }
}
