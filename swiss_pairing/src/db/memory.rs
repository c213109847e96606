//! In-process implementation of `TournamentRepository`.
//!
//! Each instance owns its own state behind a mutex. Writes validate every
//! participant before touching anything, so a rejected call leaves the store
//! exactly as it was.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::{RepositoryError, RepositoryResult};
use super::repository::TournamentRepository;
use crate::tournament::models::{
    MatchId, MatchRecord, Outcome, PlayerId, PlayerRecord, Tournament, TournamentId, bye_order,
    standings_order,
};

#[derive(Default)]
struct MemoryState {
    tournaments: BTreeMap<TournamentId, Tournament>,
    players: BTreeMap<PlayerId, PlayerRecord>,
    matches: Vec<MatchRecord>,
    next_tournament_id: TournamentId,
    next_player_id: PlayerId,
    next_match_id: MatchId,
}

impl MemoryState {
    fn players_of(&self, tournament_id: TournamentId) -> Vec<PlayerRecord> {
        self.players
            .values()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect()
    }

    fn require_tournament(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        if self.tournaments.contains_key(&tournament_id) {
            Ok(())
        } else {
            Err(RepositoryError::TournamentNotFound(tournament_id))
        }
    }
}

/// Mutex-guarded store for embedding and tests
#[derive(Default)]
pub struct MemoryTournamentRepository {
    state: Mutex<MemoryState>,
}

impl MemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite a stored player without touching the match log
    #[cfg(test)]
    pub(crate) fn tamper_player(&self, player_id: PlayerId, edit: impl FnOnce(&mut PlayerRecord)) {
        if let Some(player) = self.state().players.get_mut(&player_id) {
            edit(player);
        }
    }
}

#[async_trait]
impl TournamentRepository for MemoryTournamentRepository {
    async fn create_tournament(&self, name: &str, game: &str) -> RepositoryResult<Tournament> {
        let mut state = self.state();
        state.next_tournament_id += 1;
        let tournament = Tournament {
            id: state.next_tournament_id,
            name: name.to_string(),
            game: game.to_string(),
            created_at: Utc::now(),
        };
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn register_player(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> RepositoryResult<PlayerRecord> {
        let mut state = self.state();
        state.require_tournament(tournament_id)?;
        state.next_player_id += 1;
        let player = PlayerRecord::new(state.next_player_id, tournament_id, name);
        state.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn count_players(&self, tournament_id: TournamentId) -> RepositoryResult<usize> {
        let state = self.state();
        Ok(state
            .players
            .values()
            .filter(|p| p.tournament_id == tournament_id)
            .count())
    }

    async fn list_standings(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<PlayerRecord>> {
        let mut players = self.state().players_of(tournament_id);
        players.sort_by(standings_order);
        Ok(players)
    }

    async fn list_players_by_byes_ascending(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<PlayerRecord>> {
        let mut players = self.state().players_of(tournament_id);
        players.sort_by(bye_order);
        Ok(players)
    }

    async fn record_outcome(
        &self,
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        outcome: Outcome,
    ) -> RepositoryResult<MatchRecord> {
        let mut state = self.state();
        state.require_tournament(tournament_id)?;

        if Outcome::from_columns(player1, player2, outcome.winner_column()) != Some(outcome) {
            return Err(RepositoryError::CorruptRecord(format!(
                "outcome {outcome} does not fit pair ({player1}, {player2})"
            )));
        }

        let participants = if player1 == player2 {
            vec![player1]
        } else {
            vec![player1, player2]
        };

        for &player_id in &participants {
            let registered = state
                .players
                .get(&player_id)
                .is_some_and(|p| p.tournament_id == tournament_id);
            if !registered {
                return Err(RepositoryError::PlayerNotFound {
                    tournament_id,
                    player_id,
                });
            }
        }

        for player_id in participants {
            if let Some(player) = state.players.get_mut(&player_id) {
                outcome.apply(player);
            }
        }

        state.next_match_id += 1;
        let record = MatchRecord {
            id: state.next_match_id,
            tournament_id,
            player1,
            player2,
            outcome,
            recorded_at: Utc::now(),
        };
        state.matches.push(record.clone());

        Ok(record)
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<MatchRecord>> {
        let state = self.state();
        Ok(state
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn reset_tournament(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        let mut state = self.state();
        state.matches.retain(|m| m.tournament_id != tournament_id);
        for player in state
            .players
            .values_mut()
            .filter(|p| p.tournament_id == tournament_id)
        {
            *player = player.zeroed();
        }
        Ok(())
    }

    async fn remove_players(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        let mut state = self.state();
        state.matches.retain(|m| m.tournament_id != tournament_id);
        state.players.retain(|_, p| p.tournament_id != tournament_id);
        Ok(())
    }
}
