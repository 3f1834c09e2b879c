use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;

// ─── Log Events ───────────────────────────────────────────────────

/// Semantic event recognised in a single server log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// A player chat message (`<username> message`).
    Chat { username: String, message: String },
    /// A player joined the server.
    Login { username: String },
    /// A player left the server.
    Logout { username: String },
    /// The server finished starting and accepts connections.
    Start,
    /// The server began shutting down.
    Stop,
}

impl LogEvent {
    /// Subscription channel this event is published on.
    pub fn channel(&self) -> Channel {
        match self {
            Self::Chat { .. } => Channel::Chat,
            Self::Login { .. } | Self::Logout { .. } => Channel::LoginOrLogout,
            Self::Start | Self::Stop => Channel::StartOrStop,
        }
    }

    /// Player the event concerns, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Chat { username, .. } | Self::Login { username } | Self::Logout { username } => {
                Some(username)
            }
            Self::Start | Self::Stop => None,
        }
    }
}

/// Chat-bridge notification text.
impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat { username, message } => write!(f, "`<{username}>` {message}"),
            Self::Login { username } => write!(f, "> `{username}` logged in"),
            Self::Logout { username } => write!(f, "> `{username}` logged out"),
            Self::Start => f.write_str("> server started"),
            Self::Stop => f.write_str("> server stopped"),
        }
    }
}

// ─── Channels ─────────────────────────────────────────────────────

/// Named event channel that listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Chat,
    LoginOrLogout,
    StartOrStop,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Chat, Self::LoginOrLogout, Self::StartOrStop];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::LoginOrLogout => "login-or-logout",
            Self::StartOrStop => "start-or-stop",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "login-or-logout" => Ok(Self::LoginOrLogout),
            "start-or-stop" => Ok(Self::StartOrStop),
            _ => Err(PatternError::UnknownChannel(s.to_owned())),
        }
    }
}
