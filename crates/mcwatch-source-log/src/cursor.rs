//! File cursor: last observed size and mtime of the tailed file, plus the
//! growth/truncation comparison that decides what a poll cycle does.

use chrono::{DateTime, Utc};

/// One stat snapshot of the tailed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// What a poll cycle should do given the cursor and a fresh stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAction {
    /// Same size as last cycle.
    Unchanged,
    /// File shrank (rotated or cleared). Resync without reading.
    Truncated { from: u64, to: u64 },
    /// File grew. Read `[from, to)`.
    Grew { from: u64, to: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileCursor {
    last_size: u64,
    last_modified_at: DateTime<Utc>,
}

impl FileCursor {
    /// Seed the cursor at the end of the file as it is now.
    pub fn at_end_of(stat: FileStat) -> Self {
        Self {
            last_size: stat.size,
            last_modified_at: stat.modified_at,
        }
    }

    pub fn last_size(&self) -> u64 {
        self.last_size
    }

    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    pub fn compare(&self, stat: &FileStat) -> CursorAction {
        use std::cmp::Ordering;

        match stat.size.cmp(&self.last_size) {
            Ordering::Greater => CursorAction::Grew {
                from: self.last_size,
                to: stat.size,
            },
            Ordering::Less => CursorAction::Truncated {
                from: self.last_size,
                to: stat.size,
            },
            Ordering::Equal => CursorAction::Unchanged,
        }
    }

    /// Move the cursor to the observed snapshot (after a read or a reset).
    pub fn advance(&mut self, stat: FileStat) {
        self.last_size = stat.size;
        self.last_modified_at = stat.modified_at;
    }
}
