//! Tournament manager: the entry point a tournament-runner talks to.
//!
//! Every operation that reads standings and then writes results holds the
//! tournament's own async mutex for its whole duration, so two callers can
//! never pick the same bye recipient or double-count a match. Different
//! tournaments never wait on each other.

use super::{
    audit::check_consistency,
    bye::ByeAllocator,
    errors::{TournamentError, TournamentResult},
    models::{
        MatchRecord, Outcome, PlayerId, PlayerRecord, RoundPairings, Tournament, TournamentId,
        pair_key,
    },
    pairing::PairingEngine,
    recorder::MatchRecorder,
};
use crate::db::TournamentRepository;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Pairs already resolved since the tournament was last paired
#[derive(Debug, Default)]
struct RoundLedger {
    resolved: HashSet<(PlayerId, PlayerId)>,
}

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repository: Arc<dyn TournamentRepository>,
    recorder: MatchRecorder,
    engine: PairingEngine,
    rounds: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<RoundLedger>>>>>,
}

impl TournamentManager {
    /// Create a new tournament manager over a persistence collaborator
    pub fn new(repository: Arc<dyn TournamentRepository>) -> Self {
        let recorder = MatchRecorder::new(repository.clone());
        let allocator = ByeAllocator::new(repository.clone(), recorder.clone());
        let engine = PairingEngine::new(repository.clone(), allocator);

        Self {
            repository,
            recorder,
            engine,
            rounds: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Critical section for one tournament
    async fn round_lock(&self, tournament_id: TournamentId) -> Arc<Mutex<RoundLedger>> {
        if let Some(lock) = self.rounds.read().await.get(&tournament_id) {
            return lock.clone();
        }
        self.rounds
            .write()
            .await
            .entry(tournament_id)
            .or_default()
            .clone()
    }

    /// Create a new tournament
    pub async fn create_tournament(&self, name: &str, game: &str) -> TournamentResult<Tournament> {
        let tournament = self.repository.create_tournament(name, game).await?;
        log::info!(
            "Created tournament {} '{}' ({})",
            tournament.id,
            tournament.name,
            tournament.game
        );
        Ok(tournament)
    }

    /// Register a player for a tournament
    pub async fn register_player(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> TournamentResult<PlayerRecord> {
        Ok(self.repository.register_player(tournament_id, name).await?)
    }

    /// Number of players registered in a tournament
    pub async fn count_players(&self, tournament_id: TournamentId) -> TournamentResult<usize> {
        Ok(self.repository.count_players(tournament_id).await?)
    }

    /// Current standings, weakest record first
    pub async fn standings(&self, tournament_id: TournamentId) -> TournamentResult<Vec<PlayerRecord>> {
        Ok(self.repository.list_standings(tournament_id).await?)
    }

    /// Match log in the order it was recorded
    pub async fn match_history(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<MatchRecord>> {
        Ok(self.repository.list_matches(tournament_id).await?)
    }

    /// Pair the next round
    ///
    /// Starts a new round: reports made before this call no longer count as
    /// duplicates.
    pub async fn pair_round(&self, tournament_id: TournamentId) -> TournamentResult<RoundPairings> {
        let lock = self.round_lock(tournament_id).await;
        let mut ledger = lock.lock().await;

        let round = self.engine.pair(tournament_id).await?;

        ledger.resolved.clear();
        if let Some(bye) = &round.bye {
            ledger.resolved.insert(pair_key(bye.id, bye.id));
        }

        Ok(round)
    }

    /// Report the result of one match
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidMatchReport` - The outcome does not fit the
    ///   pair, a player is unknown, or this pair was already reported since
    ///   the last `pair_round`
    pub async fn report_match(
        &self,
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        outcome: Outcome,
    ) -> TournamentResult<MatchRecord> {
        let lock = self.round_lock(tournament_id).await;
        let mut ledger = lock.lock().await;

        let key = pair_key(player1, player2);
        if ledger.resolved.contains(&key) {
            log::warn!(
                "Tournament {}: duplicate report for {} vs {}",
                tournament_id,
                player1,
                player2
            );
            return Err(TournamentError::invalid_report(
                tournament_id,
                player1,
                player2,
                "this pair has already been reported for the current round",
            ));
        }

        let record = self
            .recorder
            .record(tournament_id, player1, player2, outcome)
            .await?;
        ledger.resolved.insert(key);

        Ok(record)
    }

    /// Clear the match log and zero every counter of one tournament
    pub async fn reset_tournament(&self, tournament_id: TournamentId) -> TournamentResult<()> {
        let lock = self.round_lock(tournament_id).await;
        let mut ledger = lock.lock().await;

        self.repository.reset_tournament(tournament_id).await?;
        ledger.resolved.clear();

        log::info!("Tournament {}: matches cleared and standings reset", tournament_id);
        Ok(())
    }

    /// Delete every player and match of one tournament
    pub async fn remove_players(&self, tournament_id: TournamentId) -> TournamentResult<()> {
        let lock = self.round_lock(tournament_id).await;
        let mut ledger = lock.lock().await;

        self.repository.remove_players(tournament_id).await?;
        ledger.resolved.clear();

        log::info!("Tournament {}: players removed", tournament_id);
        Ok(())
    }

    /// Verify that stored counters equal a replay of the match log
    ///
    /// Returns the standings that passed the check.
    pub async fn verify_consistency(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<PlayerRecord>> {
        let lock = self.round_lock(tournament_id).await;
        let _ledger = lock.lock().await;

        let players = self.repository.list_standings(tournament_id).await?;
        let matches = self.repository.list_matches(tournament_id).await?;

        if let Err(e) = check_consistency(tournament_id, &players, &matches) {
            log::warn!("Tournament {}: audit failed: {}", tournament_id, e);
            return Err(e);
        }

        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryTournamentRepository, RepositoryError, RepositoryResult};
    use async_trait::async_trait;

    async fn manager_with(players: usize) -> (TournamentManager, Arc<MemoryTournamentRepository>, TournamentId, Vec<PlayerId>) {
        let repo = Arc::new(MemoryTournamentRepository::new());
        let manager = TournamentManager::new(repo.clone());
        let t = manager.create_tournament("Manager Masters", "chess").await.unwrap().id;
        let mut ids = Vec::new();
        for i in 0..players {
            ids.push(manager.register_player(t, &format!("Player {i}")).await.unwrap().id);
        }
        (manager, repo, t, ids)
    }

    /// Collaborator whose every call fails
    struct FailingRepository;

    fn outage() -> RepositoryError {
        RepositoryError::Database(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl TournamentRepository for FailingRepository {
        async fn create_tournament(&self, _name: &str, _game: &str) -> RepositoryResult<Tournament> {
            Err(outage())
        }
        async fn register_player(&self, _t: TournamentId, _name: &str) -> RepositoryResult<PlayerRecord> {
            Err(outage())
        }
        async fn count_players(&self, _t: TournamentId) -> RepositoryResult<usize> {
            Err(outage())
        }
        async fn list_standings(&self, _t: TournamentId) -> RepositoryResult<Vec<PlayerRecord>> {
            Err(outage())
        }
        async fn list_players_by_byes_ascending(
            &self,
            _t: TournamentId,
        ) -> RepositoryResult<Vec<PlayerRecord>> {
            Err(outage())
        }
        async fn record_outcome(
            &self,
            _t: TournamentId,
            _p1: PlayerId,
            _p2: PlayerId,
            _outcome: Outcome,
        ) -> RepositoryResult<MatchRecord> {
            Err(outage())
        }
        async fn list_matches(&self, _t: TournamentId) -> RepositoryResult<Vec<MatchRecord>> {
            Err(outage())
        }
        async fn reset_tournament(&self, _t: TournamentId) -> RepositoryResult<()> {
            Err(outage())
        }
        async fn remove_players(&self, _t: TournamentId) -> RepositoryResult<()> {
            Err(outage())
        }
    }

    #[tokio::test]
    async fn test_duplicate_report_in_round_is_rejected() {
        let (manager, repo, t, ids) = manager_with(4).await;
        manager.pair_round(t).await.unwrap();

        manager
            .report_match(t, ids[0], ids[1], Outcome::Win(ids[0]))
            .await
            .unwrap();
        let err = manager
            .report_match(t, ids[1], ids[0], Outcome::Win(ids[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidMatchReport { .. }));

        // Only the first report reached the log
        assert_eq!(repo.list_matches(t).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_new_round_clears_duplicate_ledger() {
        let (manager, _repo, t, ids) = manager_with(2).await;
        manager.pair_round(t).await.unwrap();
        manager.report_match(t, ids[0], ids[1], Outcome::Draw).await.unwrap();

        manager.pair_round(t).await.unwrap();
        manager.report_match(t, ids[0], ids[1], Outcome::Draw).await.unwrap();

        let standings = manager.standings(t).await.unwrap();
        assert!(standings.iter().all(|p| p.draws == 2 && p.matches_played == 2));
    }

    #[tokio::test]
    async fn test_rejected_report_does_not_block_a_valid_one() {
        let (manager, _repo, t, ids) = manager_with(3).await;
        let err = manager
            .report_match(t, ids[0], ids[1], Outcome::Win(ids[2]))
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidMatchReport { .. }));

        manager
            .report_match(t, ids[0], ids[1], Outcome::Win(ids[1]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_manual_bye_for_round_bye_recipient_is_duplicate() {
        let (manager, _repo, t, _ids) = manager_with(3).await;
        let round = manager.pair_round(t).await.unwrap();
        let bye = round.bye.unwrap();

        let err = manager
            .report_match(t, bye.id, bye.id, Outcome::Bye(bye.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidMatchReport { .. }));
    }

    #[tokio::test]
    async fn test_reset_zeroes_counters_and_clears_ledger() {
        let (manager, _repo, t, ids) = manager_with(2).await;
        manager.report_match(t, ids[0], ids[1], Outcome::Win(ids[0])).await.unwrap();

        manager.reset_tournament(t).await.unwrap();
        let standings = manager.standings(t).await.unwrap();
        assert_eq!(standings.len(), 2);
        assert!(standings.iter().all(|p| p.matches_played == 0 && p.wins == 0 && p.losses == 0));
        assert!(manager.match_history(t).await.unwrap().is_empty());

        manager.report_match(t, ids[0], ids[1], Outcome::Win(ids[1])).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_players() {
        let (manager, _repo, t, _ids) = manager_with(4).await;
        manager.pair_round(t).await.unwrap();
        manager.remove_players(t).await.unwrap();
        assert_eq!(manager.count_players(t).await.unwrap(), 0);

        let err = manager.pair_round(t).await.unwrap_err();
        assert!(matches!(err, TournamentError::EmptyPool { .. }));
    }

    #[tokio::test]
    async fn test_verify_consistency_after_play() {
        let (manager, _repo, t, ids) = manager_with(5).await;
        let round = manager.pair_round(t).await.unwrap();
        for pairing in &round.pairings {
            manager
                .report_match(t, pairing.player1_id, pairing.player2_id, Outcome::Win(pairing.player2_id))
                .await
                .unwrap();
        }

        let standings = manager.verify_consistency(t).await.unwrap();
        assert_eq!(standings.len(), ids.len());
        assert_eq!(standings.iter().map(|p| p.matches_played).sum::<u32>(), 5);
    }

    #[tokio::test]
    async fn test_verify_consistency_detects_tampering() {
        let (manager, repo, t, ids) = manager_with(2).await;
        manager.report_match(t, ids[0], ids[1], Outcome::Draw).await.unwrap();

        repo.tamper_player(ids[1], |p| {
            p.draws = 0;
            p.wins = 1;
        });

        let err = manager.verify_consistency(t).await.unwrap_err();
        assert!(matches!(err, TournamentError::InconsistentState { player_id, .. } if player_id == ids[1]));
    }

    #[tokio::test]
    async fn test_persistence_failures_propagate() {
        let manager = TournamentManager::new(Arc::new(FailingRepository));

        let err = manager.pair_round(1).await.unwrap_err();
        assert!(matches!(err, TournamentError::Persistence(RepositoryError::Database(_))));

        let err = manager.report_match(1, 1, 2, Outcome::Draw).await.unwrap_err();
        assert!(matches!(err, TournamentError::Persistence(_)));
        assert_eq!(err.client_message(), "Internal server error");

        let err = manager.reset_tournament(1).await.unwrap_err();
        assert!(matches!(err, TournamentError::Persistence(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_rounds_never_share_a_bye() {
        let (manager, _repo, t, ids) = manager_with(5).await;

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.pair_round(t).await })
            })
            .collect();

        let mut recipients = Vec::new();
        for handle in handles {
            let round = handle.await.unwrap().unwrap();
            recipients.push(round.bye.unwrap().id);
        }
        recipients.sort_unstable();
        assert_eq!(recipients, ids, "each player should sit out exactly once");

        let standings = manager.verify_consistency(t).await.unwrap();
        assert!(standings.iter().all(|p| p.byes == 1 && p.matches_played == 1));
    }

    #[tokio::test]
    async fn test_tournaments_are_independent() {
        let (manager, _repo, t1, ids1) = manager_with(2).await;
        let t2 = manager.create_tournament("Side Event", "checkers").await.unwrap().id;
        let a = manager.register_player(t2, "A").await.unwrap();
        let b = manager.register_player(t2, "B").await.unwrap();

        manager.report_match(t1, ids1[0], ids1[1], Outcome::Win(ids1[0])).await.unwrap();
        manager.report_match(t2, a.id, b.id, Outcome::Win(b.id)).await.unwrap();

        manager.reset_tournament(t1).await.unwrap();
        let other = manager.standings(t2).await.unwrap();
        assert_eq!(other.iter().map(|p| p.matches_played).sum::<u32>(), 2);
    }
}
