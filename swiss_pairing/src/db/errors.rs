//! Persistence error types.

use crate::tournament::models::{PlayerId, TournamentId};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`TournamentRepository`](super::TournamentRepository)
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation did not finish in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Tournament does not exist
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    /// Player is not registered in the tournament
    #[error("Player {player_id} is not registered in tournament {tournament_id}")]
    PlayerNotFound {
        tournament_id: TournamentId,
        player_id: PlayerId,
    },

    /// Stored row violates the data model
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
