//! Final standings for the game-over screen.

use maw_types::PlayerSnapshot;

use super::peers::PeerRecord;

/// One row of the final standings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStanding {
    pub name: String,
    pub size: f32,
    pub score: u32,
    pub is_local: bool,
}

/// Rank the local player and every known peer by hole size, largest
/// first. The sort is stable, so equal sizes keep build order: the local
/// entry, then the peers as given.
pub fn rank(
    local_name: &str,
    local: &PlayerSnapshot,
    peers: &[PeerRecord],
) -> Vec<MatchStanding> {
    let mut standings = Vec::with_capacity(peers.len() + 1);
    standings.push(MatchStanding {
        name: local_name.to_string(),
        size: local.size,
        score: local.score,
        is_local: true,
    });
    for peer in peers {
        standings.push(MatchStanding {
            name: peer.name.clone(),
            size: peer.snapshot.size,
            score: peer.snapshot.score,
            is_local: false,
        });
    }
    standings.sort_by(|a, b| b.size.total_cmp(&a.size));
    standings
}
