use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::session::SessionSettings;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    network: NetworkConfig,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    broadcast: BroadcastConfig,
    #[serde(default)]
    player: PlayerConfig,
}

#[derive(Deserialize, Default)]
struct NetworkConfig {
    port: Option<u16>,
}

#[derive(Deserialize, Default)]
struct SessionConfig {
    min_players: Option<u32>,
    stale_after_secs: Option<u64>,
    match_duration_secs: Option<f32>,
}

#[derive(Deserialize, Default)]
struct BroadcastConfig {
    interval_frames: Option<u64>,
}

#[derive(Deserialize, Default)]
struct PlayerConfig {
    name: Option<String>,
}

pub struct Config {
    network: NetworkConfig,
    session: SessionConfig,
    broadcast: BroadcastConfig,
    player: PlayerConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => merge(&mut base, user),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            network: base.network,
            session: base.session,
            broadcast: base.broadcast,
            player: base.player,
        }
    }

    /// Well-known port the host listens on and clients dial by default.
    pub fn port(&self) -> u16 {
        self.network.port.unwrap_or(8080)
    }

    /// Participants (including the host) required before a match starts.
    pub fn min_players(&self) -> u32 {
        self.session.min_players.unwrap_or(2).max(1)
    }

    /// How long a remote player may stay silent before being dropped.
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.session.stale_after_secs.unwrap_or(5).clamp(1, 3600))
    }

    /// Match length in simulated seconds (clamped to 10..3600).
    pub fn match_duration(&self) -> f32 {
        self.session
            .match_duration_secs
            .unwrap_or(120.0)
            .clamp(10.0, 3600.0)
    }

    /// Frames between two outgoing player-state broadcasts.
    pub fn broadcast_interval(&self) -> u64 {
        self.broadcast.interval_frames.unwrap_or(10).clamp(1, 600)
    }

    /// Display name for the local player on the results screen.
    pub fn player_name(&self) -> String {
        self.player.name.clone().unwrap_or_else(|| "You".into())
    }

    /// Bundle the session tunables for [`crate::session::MatchSession`].
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            port: self.port(),
            min_players: self.min_players(),
            stale_after: self.stale_after(),
            match_duration: self.match_duration(),
            broadcast_interval: self.broadcast_interval(),
            player_name: self.player_name(),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("maw").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.network.port.is_some() {
        base.network.port = user.network.port;
    }
    if user.session.min_players.is_some() {
        base.session.min_players = user.session.min_players;
    }
    if user.session.stale_after_secs.is_some() {
        base.session.stale_after_secs = user.session.stale_after_secs;
    }
    if user.session.match_duration_secs.is_some() {
        base.session.match_duration_secs = user.session.match_duration_secs;
    }
    if user.broadcast.interval_frames.is_some() {
        base.broadcast.interval_frames = user.broadcast.interval_frames;
    }
    if user.player.name.is_some() {
        base.player.name = user.player.name;
    }
}
