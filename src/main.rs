use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use sprintiq_heuristics::config::{init_tracing, AppConfig};
use sprintiq_heuristics::models::{
    MemberWork, SprintSnapshot, StandupEntry, TaskOutcome, TaskSignal, TeamSnapshot,
};
use sprintiq_heuristics::{
    assess_risk, db, input, predict_blockers, report, score_team_health_with, smart_standup,
    sprint_highlights, standup, suggest, summarize_standups, FixedCollaboration,
};

#[derive(Parser)]
#[command(name = "sprintiq")]
#[command(about = "Rule-based sprint risk, blocker and team health analytics for SprintIQ", long_about = None)]
struct Cli {
    /// Evaluate as of this instant (RFC 3339) instead of the current time
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess delivery risk for a sprint
    #[command(group(
        ArgGroup::new("source")
            .args(["sprint_id", "file"])
            .required(true)
    ))]
    Risk {
        #[arg(long)]
        sprint_id: Option<i64>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Predict which open tasks are likely to become blocked
    #[command(group(
        ArgGroup::new("source")
            .args(["sprint_id", "file", "csv"])
            .required(true)
    ))]
    Blockers {
        #[arg(long)]
        sprint_id: Option<i64>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Score team health
    #[command(group(
        ArgGroup::new("source")
            .args(["team_id", "file"])
            .required(true)
    ))]
    Health {
        #[arg(long)]
        team_id: Option<i64>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = 75.0)]
        collaboration_score: f64,
    },
    /// Suggest next steps for a blocker description
    Suggest {
        #[arg(required = true, trailing_var_arg = true)]
        description: Vec<String>,
    },
    /// Summarize a day's standup submissions
    #[command(group(
        ArgGroup::new("source")
            .args(["sprint_id", "file"])
            .required(true)
    ))]
    Standup {
        #[arg(long)]
        sprint_id: Option<i64>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Build the auto-generated standup from the active sprint's work
    #[command(group(
        ArgGroup::new("source")
            .args(["team_id", "file"])
            .required(true)
    ))]
    Digest {
        #[arg(long)]
        team_id: Option<i64>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Headline completion and top performer for a sprint
    #[command(group(
        ArgGroup::new("source")
            .args(["sprint_id", "file"])
            .required(true)
    ))]
    Highlights {
        #[arg(long)]
        sprint_id: Option<i64>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Generate a markdown report from the database
    Report {
        #[arg(long)]
        sprint_id: i64,
        #[arg(long)]
        team_id: Option<i64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    init_tracing(&config.log_level);

    let now = cli.now.unwrap_or_else(Utc::now);
    debug!(%now, "evaluation instant");

    match cli.command {
        Commands::Risk { sprint_id, file } => {
            let snapshot: SprintSnapshot = match (sprint_id, file) {
                (Some(id), _) => db::fetch_sprint_snapshot(&db::connect(&config).await?, id).await?,
                (None, Some(path)) => input::load_json(&path)?,
                (None, None) => anyhow::bail!("no input source given"),
            };
            let assessment = assess_risk(&snapshot, now);
            info!(sprint_id = assessment.sprint_id, level = %assessment.level, "sprint risk assessed");

            emit(cli.json, &assessment, || {
                println!(
                    "{} risk for {}: {:.0}% completion probability, ~{} task(s) likely unfinished",
                    assessment.level,
                    assessment.sprint_name,
                    assessment.completion_probability,
                    assessment.predicted_unfinished_tasks
                );
                for factor in &assessment.factors {
                    println!("- {factor}");
                }
                for recommendation in &assessment.recommendations {
                    println!("  -> {recommendation}");
                }
            })?;
        }
        Commands::Blockers {
            sprint_id,
            file,
            csv,
        } => {
            let signals: Vec<TaskSignal> = match (sprint_id, file, csv) {
                (Some(id), _, _) => db::fetch_task_signals(&db::connect(&config).await?, id).await?,
                (None, Some(path), _) => input::load_json(&path)?,
                (None, None, Some(path)) => input::import_task_signals(&path)?,
                (None, None, None) => anyhow::bail!("no input source given"),
            };
            let predictions = predict_blockers(&signals, now);
            info!(
                tasks = signals.len(),
                flagged = predictions.len(),
                "blocker predictions computed"
            );

            emit(cli.json, &predictions, || {
                if predictions.is_empty() {
                    println!("No tasks above the blocker threshold.");
                    return;
                }
                for prediction in &predictions {
                    println!(
                        "- #{} {} ({}%): {}",
                        prediction.task_id,
                        prediction.task_title,
                        prediction.probability,
                        prediction.reasons.join(", ")
                    );
                    println!("  -> {}", prediction.actions.join("; "));
                }
            })?;
        }
        Commands::Health {
            team_id,
            file,
            collaboration_score,
        } => {
            let snapshot: TeamSnapshot = match (team_id, file) {
                (Some(id), _) => db::fetch_team_snapshot(&db::connect(&config).await?, id, now).await?,
                (None, Some(path)) => input::load_json(&path)?,
                (None, None) => anyhow::bail!("no input source given"),
            };
            let health = score_team_health_with(
                &snapshot,
                now,
                &FixedCollaboration(collaboration_score),
            );
            info!(team_id = health.team_id, overall = health.overall, "team health scored");

            emit(cli.json, &health, || {
                println!("{} health {:.1}/100", health.team_name, health.overall);
                println!(
                    "morale {:.0}, workload {:.0}, collaboration {:.0}, burnout risk {:.0}, velocity {:+.1}%",
                    health.morale,
                    health.workload_balance,
                    health.collaboration,
                    health.burnout_risk,
                    health.velocity_trend
                );
                for insight in &health.insights {
                    println!("- [{}] {}", insight.severity, insight.message);
                }
            })?;
        }
        Commands::Suggest { description } => {
            let description = description.join(" ");
            let bullets = suggest(&description);
            emit(cli.json, &bullets, || {
                println!("{}", sprintiq_heuristics::suggest::render_suggestion(&description));
            })?;
        }
        Commands::Standup {
            sprint_id,
            file,
            date,
        } => {
            let date = date.unwrap_or_else(|| now.date_naive());
            let entries: Vec<StandupEntry> = match (sprint_id, file) {
                (Some(id), _) => {
                    db::fetch_standup_entries(&db::connect(&config).await?, id, date).await?
                }
                (None, Some(path)) => input::load_json(&path)?,
                (None, None) => anyhow::bail!("no input source given"),
            };
            let summary = summarize_standups(&entries);
            emit(cli.json, &summary, || {
                println!("{}", standup::render_standup_summary(summary.as_ref()));
            })?;
        }
        Commands::Digest {
            team_id,
            file,
            date,
        } => {
            let date = date.unwrap_or_else(|| now.date_naive());
            let members: Vec<MemberWork> = match (team_id, file) {
                (Some(id), _) => db::fetch_member_work(&db::connect(&config).await?, id).await?,
                (None, Some(path)) => input::load_json(&path)?,
                (None, None) => anyhow::bail!("no input source given"),
            };
            let digest = smart_standup(&members, date);
            emit(cli.json, &digest, || {
                println!(
                    "Standup for {}: {} completed, {} in progress, {} blocker(s)",
                    digest.date, digest.tasks_completed, digest.tasks_in_progress, digest.total_blockers
                );
                for member in &digest.members {
                    println!(
                        "- {} ({:?}): done {:?}, next {:?}",
                        member.user_name,
                        member.sentiment,
                        member.completed_yesterday,
                        member.planned_today
                    );
                    for blocker in &member.blockers {
                        println!("  ! {:?}: {}", blocker.severity, blocker.description);
                    }
                }
                for insight in &digest.insights {
                    println!("* {}: {}", insight.title, insight.description);
                }
            })?;
        }
        Commands::Highlights { sprint_id, file } => {
            let outcomes: Vec<TaskOutcome> = match (sprint_id, file) {
                (Some(id), _) => db::fetch_task_outcomes(&db::connect(&config).await?, id).await?,
                (None, Some(path)) => input::load_json(&path)?,
                (None, None) => anyhow::bail!("no input source given"),
            };
            let highlights = sprint_highlights(&outcomes);
            emit(cli.json, &highlights, || {
                for line in &highlights {
                    println!("{line}");
                }
            })?;
        }
        Commands::Report {
            sprint_id,
            team_id,
            out,
        } => {
            let pool = db::connect(&config).await?;
            let snapshot = db::fetch_sprint_snapshot(&pool, sprint_id).await?;
            let signals = db::fetch_task_signals(&pool, sprint_id).await?;
            let health = match team_id {
                Some(id) => Some(score_team_health_with(
                    &db::fetch_team_snapshot(&pool, id, now).await?,
                    now,
                    &FixedCollaboration::default(),
                )),
                None => None,
            };

            let report = report::build_report(
                now,
                &assess_risk(&snapshot, now),
                &predict_blockers(&signals, now),
                health.as_ref(),
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}
