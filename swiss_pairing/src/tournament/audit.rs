//! Consistency audit: player counters must equal a replay of the match log.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{MatchRecord, PlayerId, PlayerRecord, TournamentId},
};
use std::collections::BTreeMap;

/// Replay the match log over zeroed copies of the players
///
/// # Errors
///
/// * `TournamentError::InconsistentState` - A match names a player missing
///   from `players`
pub fn replay_matches(
    tournament_id: TournamentId,
    players: &[PlayerRecord],
    matches: &[MatchRecord],
) -> TournamentResult<BTreeMap<PlayerId, PlayerRecord>> {
    let mut replayed: BTreeMap<PlayerId, PlayerRecord> =
        players.iter().map(|p| (p.id, p.zeroed())).collect();

    for record in matches {
        for player_id in record.participants() {
            let player = replayed.get_mut(&player_id).ok_or_else(|| {
                TournamentError::InconsistentState {
                    tournament_id,
                    player_id,
                    reason: format!("match {} references an unknown player", record.id),
                }
            })?;
            record.outcome.apply(player);
        }
    }

    Ok(replayed)
}

/// Check every stored counter against the replayed match log
pub fn check_consistency(
    tournament_id: TournamentId,
    players: &[PlayerRecord],
    matches: &[MatchRecord],
) -> TournamentResult<()> {
    if let Some(player) = players.iter().find(|p| !p.is_consistent()) {
        return Err(TournamentError::InconsistentState {
            tournament_id,
            player_id: player.id,
            reason: format!(
                "matches_played does not equal the sum of results ({})",
                player.counters_summary()
            ),
        });
    }

    let replayed = replay_matches(tournament_id, players, matches)?;
    for player in players {
        // Every stored player was seeded into `replayed`
        let Some(expected) = replayed.get(&player.id) else {
            continue;
        };
        if !player.same_counters(expected) {
            return Err(TournamentError::InconsistentState {
                tournament_id,
                player_id: player.id,
                reason: format!(
                    "stored {} but match log yields {}",
                    player.counters_summary(),
                    expected.counters_summary()
                ),
            });
        }
    }

    Ok(())
}
