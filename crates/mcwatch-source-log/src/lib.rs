//! mcwatch-source-log: incremental tail of a Minecraft server log.
//! Detects growth and truncation by polling, reads only appended bytes,
//! classifies each new line and publishes events to channel listeners.

pub mod bus;
pub mod cursor;
pub mod error;
pub mod reader;
pub mod source;
pub mod tail;

pub use bus::{EventBus, ListenerError};
pub use cursor::{CursorAction, FileCursor, FileStat};
pub use error::TailError;
pub use reader::{FsLogFile, LogFile};
pub use source::{DEFAULT_POLL_INTERVAL, LogEventSource, SourceStatus};
pub use tail::LogTail;
