//! Line classifier: maps one server log line to at most one [`LogEvent`].
//!
//! Patterns are tried in a fixed priority order and the first match wins:
//! chat, login, logout, join/leave, ready marker, stop marker. The classifier
//! keeps no state between calls.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PatternError;
use crate::types::LogEvent;

/// Terminal color-reset sequence some server consoles append to chat text.
const COLOR_RESET: &str = "\u{1b}[m";

/// Literal stop marker printed by the server on shutdown.
pub const DEFAULT_STOP_MARKER: &str = "Stopping server";

const HEADER_PATTERN: &str = r"^\[[^\]]*\] \[[^\]]*\]: ";
const CHAT_PATTERN: &str = r"^<([^>]*)>\s(.*)$";
const LOGIN_PATTERN: &str = r"^([^\[]*)\[[^\]]*\]\slogged\sin\swith\sentity\sid.*$";
const LOGOUT_PATTERN: &str = r"^(\S*)\slost\sconnection:\sDisconnected$";
const JOINED_PATTERN: &str = r"^(\S+)\sjoined\sthe\sgame$";
const LEFT_PATTERN: &str = r"^(\S+)\sleft\sthe\sgame$";
pub const DEFAULT_START_PATTERN: &str = r#"^Done\s\([^)]*\)!\sFor\shelp,\stype\s"help"$"#;

static DEFAULT_PATTERNS: LazyLock<LogPatterns> =
    LazyLock::new(|| LogPatterns::new().expect("built-in log patterns compile"));

/// Classify a line with the built-in patterns.
pub fn classify(line: &str) -> Option<LogEvent> {
    DEFAULT_PATTERNS.classify(line)
}

/// Compiled pattern set used by the classifier.
///
/// The start pattern and the stop marker can be overridden for servers
/// whose wording differs from the defaults.
#[derive(Debug, Clone)]
pub struct LogPatterns {
    header: Regex,
    chat: Regex,
    login: Regex,
    logout: Regex,
    joined: Regex,
    left: Regex,
    start: Regex,
    stop_marker: String,
}

impl LogPatterns {
    pub fn new() -> Result<Self, PatternError> {
        Ok(Self {
            header: compile("header", HEADER_PATTERN)?,
            chat: compile("chat", CHAT_PATTERN)?,
            login: compile("login", LOGIN_PATTERN)?,
            logout: compile("logout", LOGOUT_PATTERN)?,
            joined: compile("joined", JOINED_PATTERN)?,
            left: compile("left", LEFT_PATTERN)?,
            start: compile("start", DEFAULT_START_PATTERN)?,
            stop_marker: DEFAULT_STOP_MARKER.to_owned(),
        })
    }

    /// Replace the exact text that marks a server shutdown.
    pub fn with_stop_marker(mut self, marker: impl Into<String>) -> Result<Self, PatternError> {
        let marker = marker.into();
        if marker.trim().is_empty() {
            return Err(PatternError::EmptyStopMarker);
        }
        self.stop_marker = marker;
        Ok(self)
    }

    /// Replace the regex that marks a completed server start.
    pub fn with_start_pattern(mut self, pattern: &str) -> Result<Self, PatternError> {
        self.start = compile("start", pattern)?;
        Ok(self)
    }

    pub fn stop_marker(&self) -> &str {
        &self.stop_marker
    }

    /// Classify a single line. Empty and unrecognised lines yield `None`.
    pub fn classify(&self, line: &str) -> Option<LogEvent> {
        let body = self.strip_header(line.trim_end_matches(['\r', '\n']));
        if body.is_empty() {
            return None;
        }

        if let Some(caps) = self.chat.captures(body) {
            return Some(LogEvent::Chat {
                username: caps[1].to_owned(),
                message: caps[2].replace(COLOR_RESET, ""),
            });
        }
        if let Some(caps) = self.login.captures(body) {
            return Some(LogEvent::Login {
                username: caps[1].to_owned(),
            });
        }
        if let Some(caps) = self.logout.captures(body) {
            return Some(LogEvent::Logout {
                username: caps[1].to_owned(),
            });
        }
        if let Some(caps) = self.joined.captures(body) {
            return Some(LogEvent::Login {
                username: caps[1].to_owned(),
            });
        }
        if let Some(caps) = self.left.captures(body) {
            return Some(LogEvent::Logout {
                username: caps[1].to_owned(),
            });
        }
        if self.start.is_match(body) {
            return Some(LogEvent::Start);
        }
        if body == self.stop_marker {
            return Some(LogEvent::Stop);
        }
        None
    }

    /// Drop a leading `[time] [thread/LEVEL]: ` header if present.
    fn strip_header<'a>(&self, line: &'a str) -> &'a str {
        match self.header.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }
}

impl Default for LogPatterns {
    fn default() -> Self {
        DEFAULT_PATTERNS.clone()
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError::InvalidRegex { name, source })
}
