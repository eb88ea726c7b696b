use thiserror::Error;

/// Main error type for the line suggestion engine
#[derive(Error, Debug)]
pub enum ProplineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Ingestion errors
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    // Data availability errors
    #[error("No game history for {player} ({metric})")]
    InsufficientData { player: String, metric: String },

    #[error("No matchup history for {player} vs {opponent}")]
    NoMatchupHistory { player: String, opponent: String },

    // Injury feed errors
    #[error("Player unavailable: {player} is ruled out")]
    PlayerUnavailable { player: String },

    #[error("Player not tracked by injury feed: {player}")]
    UnknownPlayer { player: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ProplineError
pub type Result<T> = std::result::Result<T, ProplineError>;
