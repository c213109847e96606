//! Repository trait for the tournament persistence collaborator.
//!
//! The pairing core never talks to a database directly; it reads standings
//! and writes outcomes through [`TournamentRepository`]. Every write listed
//! here is atomic: it either commits completely or leaves no trace.

#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::time::Duration;

use super::errors::{RepositoryError, RepositoryResult};
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, DEFAULT_TRANSACTION_TIMEOUT, with_timeout};
use crate::tournament::models::{
    MatchRecord, Outcome, PlayerId, PlayerRecord, Tournament, TournamentId,
};

/// Trait for tournament persistence operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a tournament
    async fn create_tournament(&self, name: &str, game: &str) -> RepositoryResult<Tournament>;

    /// Register a player with zeroed counters
    async fn register_player(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> RepositoryResult<PlayerRecord>;

    /// Number of players registered in the tournament
    async fn count_players(&self, tournament_id: TournamentId) -> RepositoryResult<usize>;

    /// Every player of the tournament, ascending by wins, draws, then id
    async fn list_standings(&self, tournament_id: TournamentId)
    -> RepositoryResult<Vec<PlayerRecord>>;

    /// Every player of the tournament, ascending by byes, wins, then id
    async fn list_players_by_byes_ascending(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<PlayerRecord>>;

    /// Apply an outcome to the participants and append the match, atomically
    ///
    /// Returns `RepositoryError::PlayerNotFound` without writing anything if a
    /// participant is not registered in the tournament.
    async fn record_outcome(
        &self,
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        outcome: Outcome,
    ) -> RepositoryResult<MatchRecord>;

    /// Match log of the tournament in ascending id order
    async fn list_matches(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<MatchRecord>>;

    /// Clear the tournament's matches and zero its players' counters
    async fn reset_tournament(&self, tournament_id: TournamentId) -> RepositoryResult<()>;

    /// Delete the tournament's matches and players
    async fn remove_players(&self, tournament_id: TournamentId) -> RepositoryResult<()>;
}

/// PostgreSQL implementation of `TournamentRepository`
///
/// All statements are parameterized; schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgTournamentRepository {
    pool: PgPool,
    query_timeout: Duration,
    transaction_timeout: Duration,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Override the per-query timeout; transactions get twice as long
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self.transaction_timeout = timeout * 2;
        self
    }

    async fn fetch_players(
        &self,
        tournament_id: TournamentId,
        by_byes: bool,
    ) -> RepositoryResult<Vec<PlayerRecord>> {
        let query = if by_byes {
            sqlx::query(
                r#"
                SELECT id, tournament_id, name, wins, draws, losses, byes, matches_played
                FROM players
                WHERE tournament_id = $1
                ORDER BY byes ASC, wins ASC, id ASC
                "#,
            )
        } else {
            sqlx::query(
                r#"
                SELECT id, tournament_id, name, wins, draws, losses, byes, matches_played
                FROM players
                WHERE tournament_id = $1
                ORDER BY wins ASC, draws ASC, id ASC
                "#,
            )
        };

        let rows = query.bind(tournament_id).fetch_all(&self.pool).await?;
        rows.iter().map(player_from_row).collect()
    }

    async fn record_outcome_tx(
        &self,
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        outcome: Outcome,
    ) -> RepositoryResult<MatchRecord> {
        let mut tx = self.pool.begin().await?;

        let participants = if player1 == player2 {
            vec![player1]
        } else {
            vec![player1, player2]
        };

        for player_id in participants {
            // Compute this participant's increments with the same reduction the
            // audit uses, then add them in one statement.
            let mut delta = PlayerRecord::new(player_id, tournament_id, "");
            outcome.apply(&mut delta);
            credit_player(&mut tx, tournament_id, &delta).await?;
        }

        let row = sqlx::query(
            r#"
            INSERT INTO matches (tournament_id, player1, player2, winner)
            VALUES ($1, $2, $3, $4)
            RETURNING id, recorded_at
            "#,
        )
        .bind(tournament_id)
        .bind(player1)
        .bind(player2)
        .bind(outcome.winner_column())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(MatchRecord {
            id: row.try_get("id")?,
            tournament_id,
            player1,
            player2,
            outcome,
            recorded_at: row.try_get::<DateTime<Utc>, _>("recorded_at")?,
        })
    }

    async fn reset_tournament_tx(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE players
            SET wins = 0, draws = 0, losses = 0, byes = 0, matches_played = 0
            WHERE tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_players_tx(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM players WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Add one participant's increments inside an open transaction
async fn credit_player(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
    delta: &PlayerRecord,
) -> RepositoryResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE players
        SET wins = wins + $3,
            draws = draws + $4,
            losses = losses + $5,
            byes = byes + $6,
            matches_played = matches_played + $7
        WHERE tournament_id = $1 AND id = $2
        "#,
    )
    .bind(tournament_id)
    .bind(delta.id)
    .bind(delta.wins as i32)
    .bind(delta.draws as i32)
    .bind(delta.losses as i32)
    .bind(delta.byes as i32)
    .bind(delta.matches_played as i32)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::PlayerNotFound {
            tournament_id,
            player_id: delta.id,
        });
    }

    Ok(())
}

fn counter(row: &PgRow, column: &str) -> RepositoryResult<u32> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| RepositoryError::CorruptRecord(format!("negative {column}: {value}")))
}

fn player_from_row(row: &PgRow) -> RepositoryResult<PlayerRecord> {
    Ok(PlayerRecord {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        name: row.try_get("name")?,
        wins: counter(row, "wins")?,
        draws: counter(row, "draws")?,
        losses: counter(row, "losses")?,
        byes: counter(row, "byes")?,
        matches_played: counter(row, "matches_played")?,
    })
}

fn match_from_row(row: &PgRow) -> RepositoryResult<MatchRecord> {
    let id: i64 = row.try_get("id")?;
    let player1: PlayerId = row.try_get("player1")?;
    let player2: PlayerId = row.try_get("player2")?;
    let winner: Option<PlayerId> = row.try_get("winner")?;

    let outcome = Outcome::from_columns(player1, player2, winner).ok_or_else(|| {
        RepositoryError::CorruptRecord(format!(
            "match {id} has winner {winner:?} for pair ({player1}, {player2})"
        ))
    })?;

    Ok(MatchRecord {
        id,
        tournament_id: row.try_get("tournament_id")?,
        player1,
        player2,
        outcome,
        recorded_at: row.try_get::<DateTime<Utc>, _>("recorded_at")?,
    })
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn create_tournament(&self, name: &str, game: &str) -> RepositoryResult<Tournament> {
        with_timeout(self.query_timeout, async {
            let row = sqlx::query(
                "INSERT INTO tournaments (name, game) VALUES ($1, $2) RETURNING id, created_at",
            )
            .bind(name)
            .bind(game)
            .fetch_one(&self.pool)
            .await?;

            Ok::<_, RepositoryError>(Tournament {
                id: row.try_get("id")?,
                name: name.to_string(),
                game: game.to_string(),
                created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            })
        })
        .await
    }

    async fn register_player(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> RepositoryResult<PlayerRecord> {
        with_timeout(self.query_timeout, async {
            // Insert only when the tournament exists so a missing tournament is
            // reported as such rather than as a foreign-key violation.
            let row = sqlx::query(
                r#"
                INSERT INTO players (tournament_id, name)
                SELECT id, $2 FROM tournaments WHERE id = $1
                RETURNING id, tournament_id, name, wins, draws, losses, byes, matches_played
                "#,
            )
            .bind(tournament_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::TournamentNotFound(tournament_id))?;

            player_from_row(&row)
        })
        .await
    }

    async fn count_players(&self, tournament_id: TournamentId) -> RepositoryResult<usize> {
        with_timeout(self.query_timeout, async {
            let row = sqlx::query("SELECT COUNT(*) AS count FROM players WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&self.pool)
                .await?;
            let count: i64 = row.try_get("count")?;
            usize::try_from(count)
                .map_err(|_| RepositoryError::CorruptRecord(format!("player count {count}")))
        })
        .await
    }

    async fn list_standings(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<PlayerRecord>> {
        with_timeout(self.query_timeout, self.fetch_players(tournament_id, false)).await
    }

    async fn list_players_by_byes_ascending(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<PlayerRecord>> {
        with_timeout(self.query_timeout, self.fetch_players(tournament_id, true)).await
    }

    async fn record_outcome(
        &self,
        tournament_id: TournamentId,
        player1: PlayerId,
        player2: PlayerId,
        outcome: Outcome,
    ) -> RepositoryResult<MatchRecord> {
        with_timeout(
            self.transaction_timeout,
            self.record_outcome_tx(tournament_id, player1, player2, outcome),
        )
        .await
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<MatchRecord>> {
        with_timeout(self.query_timeout, async {
            let rows = sqlx::query(
                r#"
                SELECT id, tournament_id, player1, player2, winner, recorded_at
                FROM matches
                WHERE tournament_id = $1
                ORDER BY id ASC
                "#,
            )
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?;

            rows.iter()
                .map(match_from_row)
                .collect::<RepositoryResult<Vec<_>>>()
        })
        .await
    }

    async fn reset_tournament(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        with_timeout(self.transaction_timeout, self.reset_tournament_tx(tournament_id)).await
    }

    async fn remove_players(&self, tournament_id: TournamentId) -> RepositoryResult<()> {
        with_timeout(self.transaction_timeout, self.remove_players_tx(tournament_id)).await
    }
}
