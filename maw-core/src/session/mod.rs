//! Session state: the peer store, the lobby, the final standings, and
//! the match state machine that ties them to the transport.

mod lobby;
mod machine;
mod peers;
mod results;

pub use lobby::LobbySummary;
pub use machine::{MatchPhase, MatchSession, SessionSettings, SnapshotSource};
pub use peers::PeerRecord;
pub use results::MatchStanding;
