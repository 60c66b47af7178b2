//! Centralized error types for the world client.
//!
//! Expected conditions (a map that has not arrived yet, an entity that already left)
//! are never errors; they are encoded as session state and re-checked every frame.
//! The types here cover malformed server data, configuration problems and collaborator failures.

use crate::map::MapId;

/// Errors raised while building client state from server data.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors raised while loading or validating [`ClientOptions`](crate::config::ClientOptions).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    #[error("Map request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("Music fade must be a finite, non-negative number of seconds, found {0}")]
    InvalidFade(f32),
}

/// Errors reported by the network collaborator when an outbound packet could not be queued.
///
/// Sends are fire-and-forget; a failed send is logged and retried on a later frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Not connected to a server")]
    Disconnected,

    #[error("Request for map {0} was rejected by the transport")]
    Rejected(MapId),
}

/// Result type for client operations.
pub type GameResult<T> = Result<T, GameError>;
