//! Core session logic for maw LAN multiplayer.
//!
//! Owns the lobby handshake, the remote-peer state store, the match
//! state machine, and the broadcast cadence. The rendering frontend
//! drives a [`MatchSession`] once per frame and reads back lobby, peer,
//! and standings views; the simulation is reached through
//! [`SnapshotSource`].

pub mod config;
pub mod session;

pub use config::Config;
pub use session::{
    LobbySummary, MatchPhase, MatchSession, MatchStanding, PeerRecord, SessionSettings,
    SnapshotSource,
};
