//! Swiss-system round management.
//!
//! This module provides the pairing core of a Swiss tournament:
//! - Player standings and the bye rotation order
//! - Round pairing by nearest neighbours in the standings
//! - Match recording with atomic counter updates
//! - A consistency audit against the match log
//!
//! ## Example
//!
//! ```no_run
//! use swiss_pairing::db::{Database, DatabaseConfig};
//! use swiss_pairing::tournament::{Outcome, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()?).await?;
//!     db.migrate().await?;
//!     let manager = TournamentManager::new(Arc::new(db.tournament_repository()));
//!
//!     let tournament = manager.create_tournament("Autumn Open", "chess").await?;
//!     for name in ["Ada", "Brian", "Carla"] {
//!         manager.register_player(tournament.id, name).await?;
//!     }
//!
//!     let round = manager.pair_round(tournament.id).await?;
//!     for pairing in &round.pairings {
//!         manager
//!             .report_match(
//!                 tournament.id,
//!                 pairing.player1_id,
//!                 pairing.player2_id,
//!                 Outcome::Win(pairing.player1_id),
//!             )
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod bye;
pub mod errors;
pub mod manager;
pub mod models;
pub mod pairing;
pub mod recorder;

pub use audit::{check_consistency, replay_matches};
pub use bye::{ByeAllocator, select_bye_recipient};
pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    MatchId, MatchRecord, Outcome, Pairing, PlayerId, PlayerRecord, RoundPairings, Tournament,
    TournamentId, bye_order, pair_key, standings_order,
};
pub use pairing::{PairingEngine, pair_adjacent};
pub use recorder::{MatchRecorder, validate_report};
