use thiserror::Error;

/// Failures while building a snapshot from the SprintIQ store. Scorers
/// themselves never fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("sprint {0} not found")]
    SprintNotFound(i64),

    #[error("team {0} not found")]
    TeamNotFound(i64),

    #[error("no active sprint found for team {0}")]
    NoActiveSprint(i64),

    #[error("unknown {column} value '{value}'")]
    UnknownStatus { column: &'static str, value: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
