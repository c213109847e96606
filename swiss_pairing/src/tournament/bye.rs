//! Bye allocation for odd-sized rounds.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{Outcome, PlayerRecord, TournamentId, bye_order},
    recorder::MatchRecorder,
};
use crate::db::TournamentRepository;
use std::sync::Arc;

/// Pick the player who should sit out: fewest byes, then fewest wins, then lowest id
///
/// The collaborator's ordering is not trusted; the rule is applied here.
pub fn select_bye_recipient(players: &[PlayerRecord]) -> Option<&PlayerRecord> {
    players.iter().min_by(|a, b| bye_order(a, b))
}

/// Chooses and records byes
#[derive(Clone)]
pub struct ByeAllocator {
    repository: Arc<dyn TournamentRepository>,
    recorder: MatchRecorder,
}

impl ByeAllocator {
    pub fn new(repository: Arc<dyn TournamentRepository>, recorder: MatchRecorder) -> Self {
        Self {
            repository,
            recorder,
        }
    }

    /// Choose the bye recipient without writing anything
    ///
    /// # Errors
    ///
    /// * `TournamentError::EmptyPool` - The tournament has no players
    pub async fn choose(&self, tournament_id: TournamentId) -> TournamentResult<PlayerRecord> {
        let candidates = self
            .repository
            .list_players_by_byes_ascending(tournament_id)
            .await?;

        select_bye_recipient(&candidates)
            .cloned()
            .ok_or(TournamentError::EmptyPool { tournament_id })
    }

    /// Record a bye for a previously chosen player
    ///
    /// Returns the player's record with the bye applied.
    pub async fn grant(
        &self,
        tournament_id: TournamentId,
        recipient: &PlayerRecord,
    ) -> TournamentResult<PlayerRecord> {
        self.recorder.record_bye(tournament_id, recipient.id).await?;

        let mut updated = recipient.clone();
        Outcome::Bye(recipient.id).apply(&mut updated);

        log::info!(
            "Tournament {}: bye granted to {} '{}' (byes now {})",
            tournament_id,
            updated.id,
            updated.name,
            updated.byes
        );

        Ok(updated)
    }

    /// Choose a recipient and record their bye
    pub async fn allocate(&self, tournament_id: TournamentId) -> TournamentResult<PlayerRecord> {
        let recipient = self.choose(tournament_id).await?;
        self.grant(tournament_id, &recipient).await
    }
}
