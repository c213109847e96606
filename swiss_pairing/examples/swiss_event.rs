//! Swiss Event Example
//!
//! Runs a short three-round event for seven players over the in-memory
//! collaborator and prints the pairings and final standings.

use std::sync::Arc;
use swiss_pairing::{MemoryTournamentRepository, Outcome, TournamentManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Swiss Event Example ===\n");

    let manager = TournamentManager::new(Arc::new(MemoryTournamentRepository::new()));
    let tournament = manager.create_tournament("Thursday Blitz", "chess").await?;

    for name in ["Ada", "Brian", "Carla", "Dmitri", "Elif", "Farah", "Goran"] {
        manager.register_player(tournament.id, name).await?;
    }

    for round_no in 1..=3 {
        println!("Round {}", round_no);
        let round = manager.pair_round(tournament.id).await?;

        for pairing in &round.pairings {
            let outcome = if pairing.player1_id < pairing.player2_id {
                Outcome::Win(pairing.player1_id)
            } else {
                Outcome::Draw
            };
            println!(
                "  {} vs {}: {}",
                pairing.player1_name, pairing.player2_name, outcome
            );
            manager
                .report_match(tournament.id, pairing.player1_id, pairing.player2_id, outcome)
                .await?;
        }

        if let Some(bye) = &round.bye {
            println!("  {} sits out with a bye", bye.name);
        }
        println!();
    }

    println!("Final standings (strongest first):");
    let standings = manager.verify_consistency(tournament.id).await?;
    for player in standings.iter().rev() {
        println!(
            "  {:<8} W{} D{} L{} B{}",
            player.name, player.wins, player.draws, player.losses, player.byes
        );
    }

    Ok(())
}
