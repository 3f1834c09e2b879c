//! LogFile trait and the filesystem-backed incremental reader.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cursor::FileStat;
use crate::error::TailError;

/// Access to the tailed file. Enables mock injection for testing.
pub trait LogFile: Send + Sync {
    fn path(&self) -> &Path;

    /// Current size and modification time.
    fn stat(&self) -> Result<FileStat, TailError>;

    /// Raw bytes `[from, to)`. Decoding is left to the caller so a
    /// character split across two reads can be reassembled.
    fn read_range(&self, from: u64, to: u64) -> Result<Vec<u8>, TailError>;
}

impl<T: LogFile + ?Sized> LogFile for &T {
    fn path(&self) -> &Path {
        (**self).path()
    }

    fn stat(&self) -> Result<FileStat, TailError> {
        (**self).stat()
    }

    fn read_range(&self, from: u64, to: u64) -> Result<Vec<u8>, TailError> {
        (**self).read_range(from, to)
    }
}

/// Log file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLogFile {
    path: PathBuf,
}

impl FsLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogFile for FsLogFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn stat(&self) -> Result<FileStat, TailError> {
        let stat_err = |source| TailError::Stat {
            path: self.path.clone(),
            source,
        };
        let meta = fs::metadata(&self.path).map_err(stat_err)?;
        let modified = meta.modified().map_err(stat_err)?;

        Ok(FileStat {
            size: meta.len(),
            modified_at: DateTime::<Utc>::from(modified),
        })
    }

    fn read_range(&self, from: u64, to: u64) -> Result<Vec<u8>, TailError> {
        let read_err = |source| TailError::Read {
            path: self.path.clone(),
            from,
            to,
            source,
        };
        let mut file = File::open(&self.path).map_err(read_err)?;
        file.seek(SeekFrom::Start(from)).map_err(read_err)?;

        let len = to.saturating_sub(from);
        let mut buf = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
        file.take(len).read_to_end(&mut buf).map_err(read_err)?;

        Ok(buf)
    }
}
