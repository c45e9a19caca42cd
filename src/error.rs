use thiserror::Error;

/// Every failure the game core can report.
///
/// None of these are fatal during play: config problems fall back to the
/// default config or reject the triggering action, store failures are logged.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("could not load config: {0}")]
    ConfigLoad(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("malformed equation at token {index}: {reason}")]
    MalformedEquation { index: usize, reason: &'static str },
    #[error("corrupt history entry: {0}")]
    CorruptHistory(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
