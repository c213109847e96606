//! Tournament error types.

use super::models::{PlayerId, TournamentId};
use crate::db::RepositoryError;
use thiserror::Error;

/// Errors surfaced by pairing, bye allocation and match recording
///
/// Nothing is retried or partially applied: every variant means the
/// operation left the tournament unchanged.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// No players to pair
    #[error("Tournament {tournament_id} has no players to pair")]
    EmptyPool { tournament_id: TournamentId },

    /// Reported outcome does not fit the named pair or tournament
    #[error(
        "Invalid match report in tournament {tournament_id} ({player1} vs {player2}): {reason}"
    )]
    InvalidMatchReport {
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        reason: String,
    },

    /// Persistence collaborator failed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    /// Aggregate counters disagree with the match log
    #[error("Inconsistent state in tournament {tournament_id} for player {player_id}: {reason}")]
    InconsistentState {
        tournament_id: TournamentId,
        player_id: PlayerId,
        reason: String,
    },
}

impl TournamentError {
    pub(crate) fn invalid_report(
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        reason: impl Into<String>,
    ) -> Self {
        TournamentError::InvalidMatchReport {
            tournament_id,
            player1,
            player2,
            reason: reason.into(),
        }
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Persistence(_) => "Internal server error".to_string(),
            TournamentError::InconsistentState { tournament_id, .. } => {
                format!("Tournament {tournament_id} needs attention from an administrator")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
