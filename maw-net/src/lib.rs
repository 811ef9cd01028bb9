//! Network layer for maw LAN multiplayer.
//!
//! This crate provides the wire protocol and the TCP endpoints used to
//! synchronize match state between peers on a LAN: a hosting endpoint
//! that fans messages out to every connected client, and a client
//! endpoint holding one connection to the host.

pub mod client;
pub mod framing;
pub mod host;
pub mod protocol;

pub use client::NetClient;
pub use host::NetHost;
pub use protocol::{LobbyState, MessageBody, WireMessage};
