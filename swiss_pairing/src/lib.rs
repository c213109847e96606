//! # Swiss Pairing
//!
//! The pairing core of a Swiss-system tournament runner.
//!
//! Players never leave the event: each round, everyone is paired against a
//! player with a similar record, and with an odd head count one player sits
//! out with a bye. Rounds are driven from the outside; this library only
//! answers "who plays whom now" and "apply this result".
//!
//! ## Round lifecycle
//!
//! - **Register**: players join a tournament with zeroed counters
//! - **Pair**: standings are read, a bye is chosen if needed, and neighbours
//!   in the standings are paired
//! - **Report**: each match outcome updates both players and the match log
//!   in one atomic step
//! - **Audit**: counters can be checked against a replay of the match log
//!
//! ## Core Modules
//!
//! - [`tournament`]: Pairing, bye allocation, match recording and the manager
//! - [`db`]: Persistence collaborator (PostgreSQL and in-memory)
//!
//! ## Example
//!
//! ```
//! use swiss_pairing::{MemoryTournamentRepository, TournamentManager};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let manager = TournamentManager::new(Arc::new(MemoryTournamentRepository::new()));
//! let tournament = manager.create_tournament("Club Night", "chess").await.unwrap();
//! manager.register_player(tournament.id, "Ada").await.unwrap();
//! manager.register_player(tournament.id, "Brian").await.unwrap();
//!
//! let round = manager.pair_round(tournament.id).await.unwrap();
//! assert_eq!(round.pairings.len(), 1);
//! assert!(round.bye.is_none());
//! # });
//! ```

/// Persistence collaborator and configuration.
pub mod db;
pub use db::{Database, DatabaseConfig, MemoryTournamentRepository, PgTournamentRepository, TournamentRepository};

/// Swiss round management.
pub mod tournament;
pub use tournament::{
    MatchRecord, Outcome, Pairing, PlayerRecord, RoundPairings, TournamentError, TournamentManager,
    TournamentResult,
};
