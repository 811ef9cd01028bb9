//! Top-level match session: phase machine, network pump, and broadcast
//! cadence.
//!
//! `MatchSession` owns every piece of session state and is driven from
//! the frontend's frame loop, one `tick` per simulation frame. Each tick
//! accepts newcomers, drains the endpoint inboxes, applies the inbound
//! messages, sweeps stale peers, advances the match clock, and pushes the
//! local player state out on the broadcast cadence. Connection reader
//! threads never touch any of this state (they only feed channels inside
//! the endpoints), so every mutation happens on the ticking thread.

use std::io;
use std::time::{Duration, Instant};

use log::{info, warn};

use maw_net::{LobbyState, MessageBody, NetClient, NetHost, WireMessage};
use maw_types::{PeerId, PlayerSnapshot, SessionRole};

use super::lobby::{Lobby, LobbySummary};
use super::peers::{PeerRecord, PeerStore};
use super::results::{rank, MatchStanding};

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Menu,
    Lobby,
    Gameplay,
    GameOver,
}

/// Source of the local player's state, implemented by the simulation.
/// The session only ever reads from it; remote players are rendered as
/// decoration and never feed back into the simulation.
pub trait SnapshotSource {
    fn local_snapshot(&self) -> PlayerSnapshot;
}

/// Tunables for a session, normally sourced from
/// [`Config::session_settings`](crate::config::Config::session_settings).
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub port: u16,
    pub min_players: u32,
    pub stale_after: Duration,
    pub match_duration: f32,
    pub broadcast_interval: u64,
    pub player_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            min_players: 2,
            stale_after: Duration::from_secs(5),
            match_duration: 120.0,
            broadcast_interval: 10,
            player_name: "You".into(),
        }
    }
}

/// The active transport, if any.
enum Endpoint {
    Idle,
    Host(NetHost),
    Client(NetClient),
}

/// One process's view of a match, single or multiplayer.
pub struct MatchSession {
    phase: MatchPhase,
    role: SessionRole,
    local_id: PeerId,
    endpoint: Endpoint,
    peers: PeerStore,
    lobby: Lobby,
    host_address: Option<String>,

    clock: f32,
    elapsed_frames: u64,
    last_local: PlayerSnapshot,

    settings: SessionSettings,
}

impl MatchSession {
    pub fn new(settings: SessionSettings) -> Self {
        let local_id = PeerId::random();
        info!("session starting as peer {}", local_id);
        Self {
            phase: MatchPhase::Menu,
            role: SessionRole::Unset,
            local_id,
            endpoint: Endpoint::Idle,
            peers: PeerStore::new(),
            lobby: Lobby::new(settings.min_players),
            host_address: None,
            clock: 0.0,
            elapsed_frames: 0,
            last_local: PlayerSnapshot::default(),
            settings,
        }
    }

    // ---- menu operations -------------------------------------------------

    /// Menu -> Gameplay with no transport and no peers.
    pub fn start_single_player(&mut self) {
        if self.phase != MatchPhase::Menu {
            return;
        }
        self.begin_match();
        info!("single player match started");
    }

    /// Bind the listening endpoint and enter a one-participant lobby.
    /// On failure the session stays in the menu; hosting can be retried.
    pub fn host_match(&mut self) -> io::Result<()> {
        if self.phase != MatchPhase::Menu {
            return Ok(());
        }
        let host = match NetHost::bind(&format!("0.0.0.0:{}", self.settings.port)) {
            Ok(h) => h,
            Err(e) => {
                warn!("failed to host on port {}: {}", self.settings.port, e);
                return Err(e);
            }
        };
        let port = host.local_addr().map(|a| a.port()).unwrap_or(self.settings.port);
        self.role = SessionRole::Host;
        self.endpoint = Endpoint::Host(host);
        self.host_address = Some(advertised_address(port));
        self.phase = MatchPhase::Lobby;
        info!(
            "hosting lobby at {}",
            self.host_address.as_deref().unwrap_or("?")
        );
        Ok(())
    }

    /// Dial a hosting peer and enter its lobby. `addr` is free-form
    /// `host:port` text from the user. On failure the session stays in
    /// the menu.
    pub fn join_match(&mut self, addr: &str) -> io::Result<()> {
        if self.phase != MatchPhase::Menu {
            return Ok(());
        }
        let mut client = match NetClient::connect(addr) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to join {}: {}", addr, e);
                return Err(e);
            }
        };

        self.role = SessionRole::Client;
        self.host_address = Some(addr.to_string());
        self.phase = MatchPhase::Lobby;

        // Announce ourselves so the host learns our id right away.
        let hello = self.lobby_message();
        if let Err(e) = client.send(&hello) {
            warn!("failed to announce to {}: {}", addr, e);
        }
        self.endpoint = Endpoint::Client(client);

        info!("joined lobby at {}", addr);
        Ok(())
    }

    // ---- lobby operations ------------------------------------------------

    /// Flip the local ready flag and tell the other peers. A ready host
    /// with enough participants starts the match immediately.
    pub fn toggle_ready(&mut self) {
        if self.phase != MatchPhase::Lobby {
            return;
        }
        self.lobby.toggle_ready();
        if self.role == SessionRole::Host && self.lobby.can_start(self.participant_count()) {
            self.start_match();
        } else {
            let msg = self.lobby_message();
            self.send_to_peers(&msg);
        }
    }

    /// Abandon the lobby entirely: drop the transport and every peer and
    /// return to the menu as a fresh session.
    pub fn leave_lobby(&mut self) {
        if self.phase != MatchPhase::Lobby {
            return;
        }
        self.reset_to_menu();
        info!("left lobby");
    }

    /// Host-only: declare the match started and move into gameplay.
    fn start_match(&mut self) {
        if !self.lobby.mark_started() {
            return;
        }
        info!(
            "match starting with {} participants",
            self.participant_count()
        );
        let msg = self.lobby_message();
        self.send_to_peers(&msg);
        self.begin_match();
    }

    fn begin_match(&mut self) {
        self.phase = MatchPhase::Gameplay;
        self.clock = 0.0;
        self.elapsed_frames = 0;
    }

    // ---- per-frame drive -------------------------------------------------

    /// Advance one simulation frame: pump the network, then (in gameplay)
    /// sweep stale peers, advance the match clock, and broadcast the
    /// local player state on cadence.
    pub fn tick(&mut self, dt: f32, sim: &dyn SnapshotSource) {
        let now = Instant::now();
        self.pump_network(now);

        if self.phase != MatchPhase::Gameplay {
            return;
        }

        self.peers.sweep_stale(now, self.settings.stale_after);

        self.clock += dt;
        self.elapsed_frames += 1;
        self.last_local = sim.local_snapshot();

        if self.clock >= self.settings.match_duration {
            self.phase = MatchPhase::GameOver;
            info!("match over after {:.1}s", self.clock);
            return;
        }

        if self.role.is_multiplayer()
            && self.elapsed_frames % self.settings.broadcast_interval == 0
        {
            let msg = WireMessage::player_update(self.local_id, self.last_local);
            self.send_to_peers(&msg);
        }
    }

    /// Accept newcomers, drain inbound messages, and apply them.
    fn pump_network(&mut self, now: Instant) {
        let mut push_lobby = false;

        let inbound = match &mut self.endpoint {
            Endpoint::Idle => return,
            Endpoint::Host(host) => {
                if host.accept_connections() > 0 {
                    // Newcomers get the current lobby picture right away.
                    push_lobby = true;
                }
                host.poll_messages()
            }
            Endpoint::Client(client) => client.poll_messages(),
        };

        for msg in inbound {
            if self.apply_message(msg, now) {
                push_lobby = true;
            }
        }

        if push_lobby {
            let msg = self.lobby_message();
            self.send_to_peers(&msg);
        }
    }

    /// Apply one inbound message. Returns true when the host should
    /// answer with its authoritative lobby state.
    fn apply_message(&mut self, msg: WireMessage, now: Instant) -> bool {
        if msg.sender == self.local_id {
            // An id collision, or our own broadcast reflected back.
            warn!("ignoring message carrying our own peer id");
            return false;
        }
        match msg.body {
            MessageBody::PlayerUpdate(snapshot) => {
                self.peers.apply_player_update(msg.sender, snapshot, now);
                false
            }
            MessageBody::LobbyUpdate(update) => {
                self.peers.touch(msg.sender, now);
                if update.match_started
                    && self.role == SessionRole::Client
                    && self.phase == MatchPhase::Lobby
                {
                    // The host's declaration is authoritative; no veto.
                    info!("host started the match");
                    self.lobby.observe_started();
                    self.begin_match();
                }
                // The host answers lobby traffic with its own state so
                // every client converges on the authoritative copy.
                self.role == SessionRole::Host
            }
        }
    }

    // ---- game over -------------------------------------------------------

    /// Acknowledge the results screen. Multiplayer sessions drop back to
    /// the lobby for another round, keeping every connection; solo play
    /// returns to the menu.
    pub fn confirm_results(&mut self) {
        if self.phase != MatchPhase::GameOver {
            return;
        }
        if self.role.is_multiplayer() {
            self.lobby.reset();
            self.clock = 0.0;
            self.elapsed_frames = 0;
            self.phase = MatchPhase::Lobby;
            info!("returning to lobby for another round");
        } else {
            self.reset_to_menu();
        }
    }

    fn reset_to_menu(&mut self) {
        self.endpoint = Endpoint::Idle;
        self.role = SessionRole::Unset;
        self.host_address = None;
        self.peers.clear();
        self.lobby.reset();
        self.clock = 0.0;
        self.elapsed_frames = 0;
        self.phase = MatchPhase::Menu;
    }

    // ---- views for the frontend ------------------------------------------

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    /// Bound listening address when hosting (useful when the port is
    /// OS-assigned).
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        match &self.endpoint {
            Endpoint::Host(host) => host.local_addr().ok(),
            _ => None,
        }
    }

    /// False once a joined session has lost its host connection.
    pub fn connection_alive(&self) -> bool {
        match &self.endpoint {
            Endpoint::Client(client) => !client.connection_lost(),
            _ => true,
        }
    }

    /// Seconds left on the match clock.
    pub fn time_remaining(&self) -> f32 {
        (self.settings.match_duration - self.clock).max(0.0)
    }

    /// Lobby picture for the frontend.
    pub fn lobby_summary(&self) -> LobbySummary {
        LobbySummary {
            role: self.role,
            participant_count: self.participant_count(),
            min_players: self.lobby.min_players(),
            own_ready: self.lobby.own_ready(),
            match_started: self.lobby.match_started(),
            host_address: self.host_address.clone(),
        }
    }

    /// Last-known state of every remote participant, in no particular
    /// order. The renderer must not depend on the ordering.
    pub fn peers(&self) -> Vec<PeerRecord> {
        self.peers.snapshot_all()
    }

    /// Final standings, largest hole first.
    pub fn ranked_results(&self) -> Vec<MatchStanding> {
        rank(
            &self.settings.player_name,
            &self.last_local,
            &self.peers.snapshot_all(),
        )
    }

    // ---- internals -------------------------------------------------------

    /// Everyone this process knows about, including itself.
    fn participant_count(&self) -> u32 {
        self.peers.len() as u32 + 1
    }

    /// Our current lobby state as a wire message. `host_ready` carries
    /// this peer's own ready flag; only the host fills the address.
    fn lobby_message(&self) -> WireMessage {
        WireMessage::lobby_update(
            self.local_id,
            LobbyState {
                participant_count: self.participant_count(),
                match_started: self.lobby.match_started(),
                host_ready: self.lobby.own_ready(),
                host_address: if self.role == SessionRole::Host {
                    self.host_address.clone()
                } else {
                    None
                },
            },
        )
    }

    /// Best-effort delivery to whoever we are connected to: every client
    /// when hosting, the host when joined. At-most-once, unordered, no
    /// acknowledgement.
    fn send_to_peers(&mut self, msg: &WireMessage) {
        match &mut self.endpoint {
            Endpoint::Idle => {}
            Endpoint::Host(host) => host.broadcast(msg),
            Endpoint::Client(client) => {
                if let Err(e) = client.send(msg) {
                    warn!("send to host failed: {}", e);
                }
            }
        }
    }
}

/// `<hostname>:<port>` label shown in the lobby so other players know
/// where to point their clients.
fn advertised_address(port: u16) -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "127.0.0.1".into());
    format!("{}:{}", host, port)
}
