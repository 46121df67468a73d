use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{BlockerPrediction, RiskAssessment, TeamHealth};

const AT_RISK_LIMIT: usize = 10;

pub fn build_report(
    generated_at: DateTime<Utc>,
    risk: &RiskAssessment,
    predictions: &[BlockerPrediction],
    health: Option<&TeamHealth>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Sprint Health Report");
    let _ = writeln!(
        output,
        "Generated for {} (sprint {}) at {}",
        risk.sprint_name,
        risk.sprint_id,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Delivery Risk");
    let _ = writeln!(
        output,
        "- Level: {} ({:.0}% completion probability, ~{} task(s) likely unfinished)",
        risk.level, risk.completion_probability, risk.predicted_unfinished_tasks
    );

    if risk.factors.is_empty() {
        let _ = writeln!(output, "- No risk factors detected.");
    } else {
        for factor in &risk.factors {
            let _ = writeln!(output, "- {factor}");
        }
    }
    for recommendation in &risk.recommendations {
        let _ = writeln!(output, "  - Recommended: {recommendation}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Tasks Likely To Block");

    if predictions.is_empty() {
        let _ = writeln!(output, "No tasks above the blocker threshold.");
    } else {
        for prediction in predictions.iter().take(AT_RISK_LIMIT) {
            let _ = writeln!(
                output,
                "- #{} {} ({}%): {}",
                prediction.task_id,
                prediction.task_title,
                prediction.probability,
                prediction.reasons.join(", ")
            );
            let _ = writeln!(output, "  - Next: {}", prediction.actions.join("; "));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Team Health");

    match health {
        None => {
            let _ = writeln!(output, "No team selected.");
        }
        Some(health) => {
            let _ = writeln!(
                output,
                "- {} overall {:.1} (morale {:.0}, workload {:.0}, collaboration {:.0}, burnout risk {:.0})",
                health.team_name,
                health.overall,
                health.morale,
                health.workload_balance,
                health.collaboration,
                health.burnout_risk
            );
            let _ = writeln!(
                output,
                "- Velocity trend {:+.1}% with {} active blocker(s)",
                health.velocity_trend, health.active_blockers
            );
            for insight in &health.insights {
                let _ = writeln!(output, "- [{}] {}", insight.severity, insight.message);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Insight, InsightKind, RiskLevel, Severity};
    use chrono::TimeZone;

    fn sample_risk() -> RiskAssessment {
        RiskAssessment {
            sprint_id: 12,
            sprint_name: "Sprint 12".to_string(),
            level: RiskLevel::High,
            completion_probability: 50.0,
            predicted_unfinished_tasks: 4,
            factors: vec!["2 active blocker(s) detected".to_string()],
            recommendations: vec!["Prioritize blocker resolution immediately".to_string()],
        }
    }

    #[test]
    fn report_lists_every_section() {
        let generated_at = Utc.with_ymd_and_hms(2026, 6, 1, 8, 30, 0).unwrap();
        let predictions = vec![BlockerPrediction {
            task_id: 88,
            task_title: "Payments webhook".to_string(),
            probability: 60,
            reasons: vec!["Task is unassigned".to_string(), "Already has 1 active blocker(s)".to_string()],
            actions: vec!["Assign task to a team member immediately".to_string()],
        }];
        let health = TeamHealth {
            team_id: 2,
            team_name: "Payments".to_string(),
            overall: 82.5,
            morale: 80.0,
            workload_balance: 100.0,
            collaboration: 75.0,
            burnout_risk: 25.0,
            active_blockers: 1,
            velocity_trend: -4.0,
            insights: vec![Insight {
                kind: InsightKind::Praise,
                message: "Team is performing excellently! Keep up the great work.".to_string(),
                severity: Severity::Info,
            }],
        };

        let report = build_report(generated_at, &sample_risk(), &predictions, Some(&health));
        assert!(report.starts_with("# Sprint Health Report"));
        assert!(report.contains("Generated for Sprint 12 (sprint 12) at 2026-06-01 08:30 UTC"));
        assert!(report.contains("- Level: High (50% completion probability, ~4 task(s) likely unfinished)"));
        assert!(report.contains("- #88 Payments webhook (60%): Task is unassigned, Already has 1 active blocker(s)"));
        assert!(report.contains("Velocity trend -4.0%"));
        assert!(report.contains("- [Info] Team is performing excellently!"));
    }

    #[test]
    fn report_handles_empty_sections() {
        let generated_at = Utc.with_ymd_and_hms(2026, 6, 1, 8, 30, 0).unwrap();
        let mut risk = sample_risk();
        risk.factors.clear();
        let report = build_report(generated_at, &risk, &[], None);
        assert!(report.contains("- No risk factors detected."));
        assert!(report.contains("No tasks above the blocker threshold."));
        assert!(report.contains("No team selected."));
    }
}
