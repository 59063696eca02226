//! Error taxonomy for game construction and JSON ingestion.
//!
//! Query failures live in [`crate::query::QueryError`]; out-of-range
//! action codes are reported by value on the hot path, never through
//! these types.

use thiserror::Error;

/// Failure modes for building games and ingesting serialized payloads.
///
/// `InvalidConfig` and `InvalidState` are non-fatal: the object the
/// payload was aimed at is left untouched and the caller may retry
/// with a corrected payload.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown game `{name}` (known games: {known:?})")]
    UnknownGame {
        name: String,
        known: &'static [&'static str],
    },

    #[error("invalid config for {context}: {source}")]
    InvalidConfig {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid state for {context}: {source}")]
    InvalidState {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GameError {
    /// Wrap a serde failure as a config-ingestion error.
    pub fn bad_config(game: &str, source: serde_json::Error) -> Self {
        GameError::InvalidConfig {
            context: game.to_string(),
            source,
        }
    }

    /// Wrap a serde failure as a state-ingestion error.
    pub fn bad_state(game: &str, source: serde_json::Error) -> Self {
        GameError::InvalidState {
            context: game.to_string(),
            source,
        }
    }
}
