//! # maw-types
//!
//! Shared type definitions for the maw multiplayer stack.
//! This crate contains data structures used across maw-net and maw-core.

use serde::{Deserialize, Serialize};

/// Unique identifier for a match participant.
///
/// Each process draws one id at startup and keeps it for its lifetime.
/// Ids are not negotiated between peers; the draw covers the full u32
/// range, so two peers on the same LAN colliding is not a practical
/// concern.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(u32);

impl PeerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Draw a random id for this process.
    pub fn random() -> Self {
        Self(rand_u64() as u32)
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simple pseudo-random u64 for id generation.
fn rand_u64() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    // Simple xorshift
    let mut x = seed ^ 0x1234567890abcdef;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

/// 2D position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Per-frame state of one player's hole.
///
/// The local copy is written by the simulation tick and only read by the
/// session layer; a remote player's copy is whatever their last broadcast
/// said.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    pub size: f32,
    pub score: u32,
    pub animation: f32,
}

/// An RGBA color. The frontend maps this straight onto its draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Colors assigned to remote players, cycled by peer id.
pub const PLAYER_PALETTE: [Rgba; 6] = [
    Rgba::new(230, 41, 55, 255),   // red
    Rgba::new(0, 121, 241, 255),   // blue
    Rgba::new(0, 228, 48, 255),    // green
    Rgba::new(253, 249, 0, 255),   // yellow
    Rgba::new(200, 122, 255, 255), // purple
    Rgba::new(255, 161, 0, 255),   // orange
];

/// Palette color for a remote player.
pub fn color_for(id: PeerId) -> Rgba {
    PLAYER_PALETTE[id.get() as usize % PLAYER_PALETTE.len()]
}

/// Which side of the topology this process plays. Chosen from the menu
/// when the user hosts or joins; `Unset` means single player, with no
/// transport at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionRole {
    #[default]
    Unset,
    Host,
    Client,
}

impl SessionRole {
    /// True for roles that put traffic on the wire.
    pub fn is_multiplayer(self) -> bool {
        !matches!(self, SessionRole::Unset)
    }
}
