//! Error types for the log tail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {} bytes {from}..{to}: {source}", path.display())]
    Read {
        path: PathBuf,
        from: u64,
        to: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("log tail is already active")]
    AlreadyActive,
}
