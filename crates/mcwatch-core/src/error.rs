//! Error types for pattern configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid {name} pattern: {source}")]
    InvalidRegex {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("stop marker must not be empty")]
    EmptyStopMarker,

    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}
