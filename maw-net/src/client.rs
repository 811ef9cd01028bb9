//! Outbound endpoint for a joining peer.
//!
//! Holds exactly one connection to the host. A background reader thread
//! does the blocking reads and feeds an inbox channel; the session tick
//! drains it with `poll_messages`, so the main thread never blocks on
//! network I/O.

use std::io::{self, BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{error, info, warn};

use crate::framing::{read_message, write_message};
use crate::protocol::WireMessage;

/// Client endpoint: a single connection to a hosting peer.
pub struct NetClient {
    writer: BufWriter<TcpStream>,
    inbox: Receiver<WireMessage>,
    connection_lost: bool,
}

impl NetClient {
    /// Connect to a hosting peer and spawn the background reader.
    /// `addr` is free-form `host:port` text from the user.
    pub fn connect(addr: &str) -> io::Result<Self> {
        info!("connecting to {}", addr);

        let stream = TcpStream::connect(addr)?;
        let read_stream = stream.try_clone()?;
        let writer = BufWriter::new(stream);

        let (inbox_tx, inbox_rx) = mpsc::channel();
        thread::spawn(move || {
            host_reader(read_stream, inbox_tx);
        });

        Ok(Self {
            writer,
            inbox: inbox_rx,
            connection_lost: false,
        })
    }

    /// Send one message to the host.
    pub fn send(&mut self, msg: &WireMessage) -> io::Result<()> {
        write_message(&mut self.writer, msg)
    }

    /// Drain messages received from the host without blocking.
    pub fn poll_messages(&mut self) -> Vec<WireMessage> {
        let mut messages = Vec::new();
        loop {
            match self.inbox.try_recv() {
                Ok(msg) => messages.push(msg),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.connection_lost {
                        warn!("connection to host lost");
                        self.connection_lost = true;
                    }
                    break;
                }
            }
        }
        messages
    }

    /// True once the reader thread has gone away (host unreachable).
    pub fn connection_lost(&self) -> bool {
        self.connection_lost
    }
}

/// Background thread reading frames from the host connection.
fn host_reader(stream: TcpStream, inbox_tx: mpsc::Sender<WireMessage>) {
    let mut reader = BufReader::new(stream);

    loop {
        match read_message::<_, WireMessage>(&mut reader) {
            Ok(msg) => {
                if inbox_tx.send(msg).is_err() {
                    // Receiver dropped, client is shutting down
                    break;
                }
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    error!("host read error: {}", e);
                }
                break;
            }
        }
    }

    info!("host reader thread exiting");
}
