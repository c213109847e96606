//! Tournament data models for Swiss-system play.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tournament ID type
pub type TournamentId = i64;

/// Player ID type
pub type PlayerId = i64;

/// Match ID type
pub type MatchId = i64;

/// Tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Game label, e.g. "chess" or "checkers"
    pub game: String,
    pub created_at: DateTime<Utc>,
}

/// A registered player together with the aggregate counters of their match log
///
/// `matches_played` always equals `wins + draws + losses + byes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
    pub matches_played: u32,
}

impl PlayerRecord {
    /// Create a freshly registered player with every counter at zero
    pub fn new(id: PlayerId, tournament_id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            id,
            tournament_id,
            name: name.into(),
            wins: 0,
            draws: 0,
            losses: 0,
            byes: 0,
            matches_played: 0,
        }
    }

    /// Same identity, counters reset to zero
    pub fn zeroed(&self) -> Self {
        Self::new(self.id, self.tournament_id, self.name.clone())
    }

    /// Whether `matches_played` agrees with the individual counters
    pub fn is_consistent(&self) -> bool {
        self.matches_played == self.wins + self.draws + self.losses + self.byes
    }

    /// Whether both records carry identical counters
    pub fn same_counters(&self, other: &PlayerRecord) -> bool {
        self.wins == other.wins
            && self.draws == other.draws
            && self.losses == other.losses
            && self.byes == other.byes
            && self.matches_played == other.matches_played
    }

    /// Human-readable counter summary used in diagnostics
    pub fn counters_summary(&self) -> String {
        format!(
            "wins={} draws={} losses={} byes={} matches_played={}",
            self.wins, self.draws, self.losses, self.byes, self.matches_played
        )
    }
}

/// Standings order: ascending wins, then ascending draws, then ascending id
pub fn standings_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    a.wins
        .cmp(&b.wins)
        .then(a.draws.cmp(&b.draws))
        .then(a.id.cmp(&b.id))
}

/// Bye priority: fewest byes, then fewest wins, then ascending id
pub fn bye_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    a.byes
        .cmp(&b.byes)
        .then(a.wins.cmp(&b.wins))
        .then(a.id.cmp(&b.id))
}

/// Outcome of one reported match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum Outcome {
    /// The named player won; the other participant lost
    Win(PlayerId),
    /// Neither participant won
    Draw,
    /// The named player sat out the round
    Bye(PlayerId),
}

impl Outcome {
    /// Value of the nullable `winner` storage column
    ///
    /// A bye stores its single participant as the winner; a draw stores `NULL`.
    pub fn winner_column(&self) -> Option<PlayerId> {
        match *self {
            Outcome::Win(player) | Outcome::Bye(player) => Some(player),
            Outcome::Draw => None,
        }
    }

    /// Rebuild an outcome from the stored `(player1, player2, winner)` columns
    ///
    /// Returns `None` for column combinations the data model does not allow.
    pub fn from_columns(player1: PlayerId, player2: PlayerId, winner: Option<PlayerId>) -> Option<Self> {
        match winner {
            Some(w) if player1 == player2 && w == player1 => Some(Outcome::Bye(w)),
            Some(w) if player1 != player2 && (w == player1 || w == player2) => Some(Outcome::Win(w)),
            None if player1 != player2 => Some(Outcome::Draw),
            _ => None,
        }
    }

    /// Apply this outcome to one participant's counters
    ///
    /// The caller is responsible for only passing participants of the match.
    pub fn apply(&self, record: &mut PlayerRecord) {
        match *self {
            Outcome::Win(winner) if winner == record.id => record.wins += 1,
            Outcome::Win(_) => record.losses += 1,
            Outcome::Draw => record.draws += 1,
            Outcome::Bye(_) => record.byes += 1,
        }
        record.matches_played += 1;
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win(player) => write!(f, "win({player})"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Bye(player) => write!(f, "bye({player})"),
        }
    }
}

/// Append-only match log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub player1: PlayerId,
    /// Equal to `player1` for a bye
    pub player2: PlayerId,
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Distinct participants: one for a bye, two otherwise
    pub fn participants(&self) -> impl Iterator<Item = PlayerId> + use<> {
        let second = (self.player2 != self.player1).then_some(self.player2);
        std::iter::once(self.player1).chain(second)
    }
}

/// Order-independent key for a pair of players
pub fn pair_key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Two players assigned to face each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub player1_id: PlayerId,
    pub player1_name: String,
    pub player2_id: PlayerId,
    pub player2_name: String,
}

impl Pairing {
    pub fn new(player1: &PlayerRecord, player2: &PlayerRecord) -> Self {
        Self {
            player1_id: player1.id,
            player1_name: player1.name.clone(),
            player2_id: player2.id,
            player2_name: player2.name.clone(),
        }
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    pub fn key(&self) -> (PlayerId, PlayerId) {
        pair_key(self.player1_id, self.player2_id)
    }
}

/// Result of pairing one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPairings {
    pub tournament_id: TournamentId,
    /// Adjacent pairs in standings order
    pub pairings: Vec<Pairing>,
    /// Bye recipient with counters after the bye was recorded
    pub bye: Option<PlayerRecord>,
}

impl RoundPairings {
    /// Every player placed in a pair, in pairing order
    pub fn paired_players(&self) -> Vec<PlayerId> {
        self.pairings
            .iter()
            .flat_map(|p| [p.player1_id, p.player2_id])
            .collect()
    }
}
