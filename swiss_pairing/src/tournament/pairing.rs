//! Round pairing: nearest neighbours in standings order.

use super::{
    bye::ByeAllocator,
    errors::{TournamentError, TournamentResult},
    models::{Pairing, PlayerRecord, RoundPairings, TournamentId},
};
use crate::db::TournamentRepository;
use std::sync::Arc;

/// Pair consecutive players: (0,1), (2,3), …
///
/// A trailing unpaired player is ignored; callers remove the bye first.
pub fn pair_adjacent(standings: &[PlayerRecord]) -> Vec<Pairing> {
    standings
        .chunks_exact(2)
        .map(|pair| Pairing::new(&pair[0], &pair[1]))
        .collect()
}

/// Produces the pairings for one round
#[derive(Clone)]
pub struct PairingEngine {
    repository: Arc<dyn TournamentRepository>,
    allocator: ByeAllocator,
}

impl PairingEngine {
    pub fn new(repository: Arc<dyn TournamentRepository>, allocator: ByeAllocator) -> Self {
        Self {
            repository,
            allocator,
        }
    }

    /// Pair every active player of the tournament
    ///
    /// When the player count is odd a bye is chosen, the rest are paired, and
    /// the bye is recorded last so that any earlier failure leaves no trace.
    ///
    /// # Errors
    ///
    /// * `TournamentError::EmptyPool` - No registered players
    /// * `TournamentError::InconsistentState` - The bye candidate is missing
    ///   from the standings returned by the collaborator
    /// * `TournamentError::Persistence` - A collaborator call failed
    pub async fn pair(&self, tournament_id: TournamentId) -> TournamentResult<RoundPairings> {
        let mut standings = self.repository.list_standings(tournament_id).await?;
        if standings.is_empty() {
            return Err(TournamentError::EmptyPool { tournament_id });
        }

        let bye_recipient = if standings.len() % 2 == 1 {
            let recipient = self.allocator.choose(tournament_id).await?;
            let before = standings.len();
            standings.retain(|p| p.id != recipient.id);
            if standings.len() + 1 != before {
                return Err(TournamentError::InconsistentState {
                    tournament_id,
                    player_id: recipient.id,
                    reason: "bye candidate is not in the standings".to_string(),
                });
            }
            Some(recipient)
        } else {
            None
        };

        let pairings = pair_adjacent(&standings);

        let bye = match bye_recipient {
            Some(recipient) => Some(self.allocator.grant(tournament_id, &recipient).await?),
            None => None,
        };

        log::info!(
            "Tournament {}: paired {} match(es){}",
            tournament_id,
            pairings.len(),
            bye.as_ref()
                .map(|p| format!(", bye to {}", p.id))
                .unwrap_or_default()
        );

        Ok(RoundPairings {
            tournament_id,
            pairings,
            bye,
        })
    }
}
