//! Listening endpoint for the hosting peer.
//!
//! The host owns a non-blocking listener pumped from the session tick.
//! Each accepted connection gets a dedicated reader thread that decodes
//! frames and forwards them into a single shared inbox; the tick drains
//! the inbox with `poll_messages`. Reader threads never touch session
//! state, and only the session thread writes to the streams.

use std::io::{self, BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::{error, info, warn};

use crate::framing::{read_message, write_message};
use crate::protocol::WireMessage;

/// Hosting endpoint: one listener, many outbound connections.
pub struct NetHost {
    listener: TcpListener,
    conns: Vec<BufWriter<TcpStream>>,
    inbox_rx: Receiver<WireMessage>,
    inbox_tx: Sender<WireMessage>,
}

impl NetHost {
    /// Bind the listening socket. The listener is non-blocking so the
    /// session tick can pump `accept_connections` without stalling.
    pub fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;

        let (inbox_tx, inbox_rx) = mpsc::channel();

        info!("hosting on {}", addr);

        Ok(Self {
            listener,
            conns: Vec::new(),
            inbox_rx,
            inbox_tx,
        })
    }

    /// The actual bound address (useful when the port is OS-assigned).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept any pending connections, spawning one reader thread each.
    /// Returns how many connections were accepted this pump so the
    /// session can push its current lobby state to newcomers.
    pub fn accept_connections(&mut self) -> usize {
        let mut accepted = 0;

        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    // Reader threads must block; undo any non-blocking
                    // inheritance from the listener.
                    if let Err(e) = stream.set_nonblocking(false) {
                        error!("failed to configure stream from {}: {}", addr, e);
                        continue;
                    }
                    let read_stream = match stream.try_clone() {
                        Ok(s) => s,
                        Err(e) => {
                            error!("failed to clone stream from {}: {}", addr, e);
                            continue;
                        }
                    };

                    let inbox_tx = self.inbox_tx.clone();
                    thread::spawn(move || {
                        connection_reader(read_stream, inbox_tx);
                    });

                    self.conns.push(BufWriter::new(stream));
                    accepted += 1;

                    info!("peer connected from {}", addr);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    // No pending connections
                    break;
                }
                Err(e) => {
                    error!("accept error: {}", e);
                    break;
                }
            }
        }

        accepted
    }

    /// Drain inbound messages without blocking.
    pub fn poll_messages(&mut self) -> Vec<WireMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.inbox_rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Best-effort broadcast: write to every live connection, dropping
    /// any whose write fails. A lost client never blocks delivery to the
    /// others; its reader thread notices the broken stream on its own.
    pub fn broadcast(&mut self, msg: &WireMessage) {
        self.conns.retain_mut(|conn| match write_message(conn, msg) {
            Ok(()) => true,
            Err(e) => {
                warn!("dropping peer connection after write error: {}", e);
                false
            }
        });
    }

    /// Number of live outbound connections.
    pub fn connection_count(&self) -> usize {
        self.conns.len()
    }
}

/// Background thread reading frames from one accepted connection.
///
/// Exits on read error, EOF, or a malformed frame; only this connection
/// is affected. A peer disconnecting is the expected way for this loop
/// to end.
fn connection_reader(stream: TcpStream, inbox_tx: Sender<WireMessage>) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into());
    let mut reader = BufReader::new(stream);

    loop {
        match read_message::<_, WireMessage>(&mut reader) {
            Ok(msg) => {
                if inbox_tx.send(msg).is_err() {
                    // Receiver dropped, the session is shutting down
                    break;
                }
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    warn!("closing connection from {}: {}", peer, e);
                }
                break;
            }
        }
    }

    info!("reader for {} exiting", peer);
}
