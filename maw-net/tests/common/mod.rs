#![allow(dead_code)]
//! Test harness utilities for maw-net integration tests.

use std::io::{BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use maw_net::framing::{read_message, write_message};
use maw_net::host::NetHost;
use maw_net::protocol::{LobbyState, WireMessage};
use maw_types::{PeerId, PlayerSnapshot, Vec2};

/// A raw TCP peer for protocol-level tests: connects to a `NetHost` and
/// speaks newline-delimited JSON directly, without the client endpoint's
/// background reader.
pub struct RawPeer {
    pub reader: BufReader<TcpStream>,
    pub writer: BufWriter<TcpStream>,
}

impl RawPeer {
    pub fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    pub fn send(&mut self, msg: &WireMessage) -> std::io::Result<()> {
        write_message(&mut self.writer, msg)
    }

    /// Push raw bytes down the wire, for malformed-frame tests.
    pub fn send_raw(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    pub fn recv(&mut self) -> std::io::Result<WireMessage> {
        read_message(&mut self.reader)
    }

    /// Receive with a short timeout, for asserting that nothing arrives.
    pub fn recv_timeout(&mut self, timeout: Duration) -> std::io::Result<WireMessage> {
        self.reader.get_ref().set_read_timeout(Some(timeout))?;
        let result = read_message(&mut self.reader);
        self.reader
            .get_ref()
            .set_read_timeout(Some(Duration::from_secs(5)))?;
        result
    }
}

/// Pump the host's accept loop until it holds `expected` connections.
pub fn drive_until_connections(host: &mut NetHost, expected: usize, timeout: Duration) {
    let start = Instant::now();
    while Instant::now().duration_since(start) < timeout {
        host.accept_connections();
        if host.connection_count() >= expected {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!(
        "timed out waiting for {} connections (have {})",
        expected,
        host.connection_count()
    );
}

/// Pump the host's inbox until `expected` messages arrive, returning
/// whatever was collected when the timeout expires.
pub fn collect_messages(
    host: &mut NetHost,
    expected: usize,
    timeout: Duration,
) -> Vec<WireMessage> {
    let start = Instant::now();
    let mut messages = Vec::new();
    while Instant::now().duration_since(start) < timeout {
        host.accept_connections();
        messages.extend(host.poll_messages());
        if messages.len() >= expected {
            return messages;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    messages
}

pub fn player_update(id: u32, size: f32, score: u32) -> WireMessage {
    WireMessage::player_update(
        PeerId::new(id),
        PlayerSnapshot {
            position: Vec2::new(100.0, 200.0),
            size,
            score,
            animation: 0.0,
        },
    )
}

pub fn lobby_update(id: u32, participants: u32, started: bool, ready: bool) -> WireMessage {
    WireMessage::lobby_update(
        PeerId::new(id),
        LobbyState {
            participant_count: participants,
            match_started: started,
            host_ready: ready,
            host_address: None,
        },
    )
}
