//! mcwatch-core: event model and line classification for Minecraft server logs.
//! Pure logic, no IO.

pub mod classify;
pub mod error;
pub mod players;
pub mod types;

pub use classify::{DEFAULT_START_PATTERN, DEFAULT_STOP_MARKER, LogPatterns, classify};
pub use error::PatternError;
pub use players::{PlayerList, parse_player_list};
pub use types::{Channel, LogEvent};
