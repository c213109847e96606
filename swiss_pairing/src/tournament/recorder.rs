//! Match recording: validate a reported outcome and apply it atomically.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{MatchRecord, Outcome, PlayerId, TournamentId},
};
use crate::db::{RepositoryError, TournamentRepository};
use std::sync::Arc;

/// Applies reported outcomes to player records and appends them to the match log
#[derive(Clone)]
pub struct MatchRecorder {
    repository: Arc<dyn TournamentRepository>,
}

impl MatchRecorder {
    pub fn new(repository: Arc<dyn TournamentRepository>) -> Self {
        Self { repository }
    }

    /// Record one outcome
    ///
    /// # Arguments
    ///
    /// * `tournament_id` - Tournament the match belongs to
    /// * `player1` - First participant
    /// * `player2` - Second participant (same as `player1` for a bye)
    /// * `outcome` - `Win`, `Draw` or `Bye`
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidMatchReport` - The outcome does not fit the
    ///   pair, or a participant is not registered in the tournament. Nothing
    ///   is written.
    /// * `TournamentError::Persistence` - The collaborator failed; its
    ///   transaction guarantees nothing was written.
    pub async fn record(
        &self,
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        outcome: Outcome,
    ) -> TournamentResult<MatchRecord> {
        validate_report(tournament_id, player1, player2, outcome)?;

        match self
            .repository
            .record_outcome(tournament_id, player1, player2, outcome)
            .await
        {
            Ok(record) => {
                log::debug!(
                    "Tournament {}: recorded match {} ({} vs {}) as {}",
                    tournament_id,
                    record.id,
                    player1,
                    player2,
                    outcome
                );
                Ok(record)
            }
            Err(RepositoryError::PlayerNotFound { player_id, .. }) => {
                Err(TournamentError::invalid_report(
                    tournament_id,
                    player1,
                    player2,
                    format!("player {player_id} is not registered in this tournament"),
                ))
            }
            Err(RepositoryError::TournamentNotFound(_)) => Err(TournamentError::invalid_report(
                tournament_id,
                player1,
                player2,
                "tournament does not exist",
            )),
            Err(e) => {
                log::error!(
                    "Tournament {}: failed to record {} for {} vs {}: {}",
                    tournament_id,
                    outcome,
                    player1,
                    player2,
                    e
                );
                Err(e.into())
            }
        }
    }

    /// Record a bye for a single player
    pub async fn record_bye(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<MatchRecord> {
        self.record(tournament_id, player_id, player_id, Outcome::Bye(player_id))
            .await
    }
}

/// Check that an outcome fits the reported pair
///
/// * `Win(p)` and `Draw` need two distinct players, and `p` must be one of them.
/// * `Bye(p)` is self-referential: `player1 == player2 == p`.
pub fn validate_report(
    tournament_id: TournamentId,
    player1: PlayerId,
    player2: PlayerId,
    outcome: Outcome,
) -> TournamentResult<()> {
    let reason = match outcome {
        Outcome::Win(_) | Outcome::Draw if player1 == player2 => {
            Some("a player cannot face themselves".to_string())
        }
        Outcome::Win(winner) if winner != player1 && winner != player2 => {
            Some(format!("winner {winner} is not part of the pair"))
        }
        Outcome::Bye(player) if player1 != player2 || player != player1 => Some(format!(
            "a bye for {player} must name that player as its only participant"
        )),
        _ => None,
    };

    match reason {
        Some(reason) => {
            log::warn!(
                "Tournament {}: rejected report {} vs {} as {}: {}",
                tournament_id,
                player1,
                player2,
                outcome,
                reason
            );
            Err(TournamentError::invalid_report(
                tournament_id,
                player1,
                player2,
                reason,
            ))
        }
        None => Ok(()),
    }
}
