//! Rule-based sprint analytics for SprintIQ.
//!
//! Every scorer is a pure function of an immutable snapshot plus an explicit
//! `now`. Building the snapshot (from JSON files or the SprintIQ database)
//! is the caller's job; see [`input`] and [`db`].

pub mod blockers;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod highlights;
pub mod input;
pub mod models;
pub mod report;
pub mod risk;
pub mod standup;
pub mod suggest;

pub use blockers::predict_blockers;
pub use error::{Error, Result};
pub use health::{score_team_health, score_team_health_with, CollaborationSignal, FixedCollaboration};
pub use highlights::sprint_highlights;
pub use risk::assess_risk;
pub use standup::{smart_standup, summarize_standups};
pub use suggest::suggest;
