//! Last-known state for every remote participant.
//!
//! The store is owned by the session and only ever touched from the
//! session tick: connection reader threads hand messages over a channel
//! instead of reaching in here, so no locking is needed. A record is
//! created the first time any message arrives from an unknown peer id,
//! refreshed on every later message, and removed only by the staleness
//! sweep; a dropped TCP connection on its own does not remove anyone.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::info;

use maw_types::{color_for, PeerId, PlayerSnapshot, Rgba};

/// Everything known about one remote participant.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub id: PeerId,
    pub snapshot: PlayerSnapshot,
    pub name: String,
    pub color: Rgba,
    pub last_seen: Instant,
}

/// Map of peer id to last-known state, with timed eviction.
#[derive(Debug, Default)]
pub struct PeerStore {
    peers: HashMap<PeerId, PeerRecord>,
}

impl PeerStore {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Upsert a peer's snapshot. Latest write wins; `last_seen` never
    /// moves backwards.
    pub fn apply_player_update(&mut self, id: PeerId, snapshot: PlayerSnapshot, now: Instant) {
        let record = self.record_for(id, now);
        record.snapshot = snapshot;
        record.last_seen = record.last_seen.max(now);
    }

    /// Refresh a peer's presence without touching its snapshot. Lobby
    /// traffic counts as liveness.
    pub fn touch(&mut self, id: PeerId, now: Instant) {
        let record = self.record_for(id, now);
        record.last_seen = record.last_seen.max(now);
    }

    fn record_for(&mut self, id: PeerId, now: Instant) -> &mut PeerRecord {
        self.peers.entry(id).or_insert_with(|| {
            info!("first contact from peer {}", id);
            PeerRecord {
                id,
                snapshot: PlayerSnapshot::default(),
                name: format!("Player {}", id),
                color: color_for(id),
                last_seen: now,
            }
        })
    }

    /// Evict every peer silent for longer than `threshold`. A peer
    /// exactly at the threshold is retained; eviction needs strictly
    /// more silence.
    pub fn sweep_stale(&mut self, now: Instant, threshold: Duration) {
        self.peers.retain(|id, record| {
            let keep = now.duration_since(record.last_seen) <= threshold;
            if !keep {
                info!("peer {} went silent, dropping", id);
            }
            keep
        });
    }

    /// All known peers, in no particular order.
    pub fn snapshot_all(&self) -> Vec<PeerRecord> {
        self.peers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn clear(&mut self) {
        self.peers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(size: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            size,
            ..PlayerSnapshot::default()
        }
    }

    #[test]
    fn one_record_per_id_latest_write_wins() {
        let now = Instant::now();
        let mut store = PeerStore::new();

        store.apply_player_update(PeerId::new(1), snapshot(10.0), now);
        store.apply_player_update(PeerId::new(2), snapshot(20.0), now);
        store.apply_player_update(PeerId::new(1), snapshot(15.0), now);

        let all = store.snapshot_all();
        assert_eq!(all.len(), 2);
        let one = all.iter().find(|r| r.id == PeerId::new(1)).unwrap();
        assert_eq!(one.snapshot.size, 15.0);
    }

    #[test]
    fn new_record_gets_name_and_color() {
        let now = Instant::now();
        let mut store = PeerStore::new();
        store.touch(PeerId::new(7), now);

        let all = store.snapshot_all();
        assert_eq!(all[0].name, "Player 7");
        assert_eq!(all[0].color, color_for(PeerId::new(7)));
        assert_eq!(all[0].snapshot, PlayerSnapshot::default());
    }

    #[test]
    fn last_seen_never_decreases() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(2);
        let mut store = PeerStore::new();

        store.apply_player_update(PeerId::new(1), snapshot(1.0), t1);
        // A late-arriving update stamped before t1 must not rewind the clock.
        store.apply_player_update(PeerId::new(1), snapshot(2.0), t0);

        let all = store.snapshot_all();
        assert_eq!(all[0].last_seen, t1);
        assert_eq!(all[0].snapshot.size, 2.0);
    }

    #[test]
    fn sweep_retains_at_exact_threshold() {
        let t0 = Instant::now();
        let threshold = Duration::from_secs(5);
        let mut store = PeerStore::new();
        store.touch(PeerId::new(1), t0);

        store.sweep_stale(t0 + threshold, threshold);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sweep_removes_strictly_past_threshold() {
        let t0 = Instant::now();
        let threshold = Duration::from_secs(5);
        let mut store = PeerStore::new();
        store.touch(PeerId::new(1), t0);

        store.sweep_stale(t0 + threshold + Duration::from_millis(1), threshold);
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_only_removes_the_stale() {
        let t0 = Instant::now();
        let threshold = Duration::from_secs(5);
        let mut store = PeerStore::new();
        store.touch(PeerId::new(1), t0);
        store.touch(PeerId::new(2), t0 + Duration::from_secs(4));

        store.sweep_stale(t0 + Duration::from_secs(6), threshold);
        let all = store.snapshot_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, PeerId::new(2));
    }

    #[test]
    fn traffic_resets_the_staleness_clock() {
        let t0 = Instant::now();
        let threshold = Duration::from_secs(5);
        let mut store = PeerStore::new();
        store.touch(PeerId::new(1), t0);
        store.apply_player_update(PeerId::new(1), snapshot(3.0), t0 + Duration::from_secs(4));

        store.sweep_stale(t0 + Duration::from_secs(8), threshold);
        assert_eq!(store.len(), 1);
    }
}
