//! One tailed log file: cursor, partial-line buffer and the poll cycle
//! (stat → compare → read delta → split → classify).

use std::sync::Arc;

use mcwatch_core::{LogEvent, LogPatterns};
use tracing::{debug, info, trace, warn};

use crate::cursor::{CursorAction, FileCursor};
use crate::error::TailError;
use crate::reader::LogFile;

/// Longest unterminated line kept across cycles before it is discarded.
const MAX_PARTIAL_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug)]
pub struct LogTail<F: LogFile> {
    file: Arc<F>,
    patterns: LogPatterns,
    cursor: FileCursor,
    /// Unterminated final line from the previous delta, undecoded.
    incomplete: Vec<u8>,
    /// Skipping the remainder of an oversized line up to its newline.
    discarding: bool,
}

impl<F: LogFile> LogTail<F> {
    /// Start tailing at the file's current end. Existing content is skipped.
    pub fn new(file: Arc<F>, patterns: LogPatterns) -> Result<Self, TailError> {
        let stat = file.stat()?;
        debug!(path = %file.path().display(), size = stat.size, "seeded log cursor");

        Ok(Self {
            file,
            patterns,
            cursor: FileCursor::at_end_of(stat),
            incomplete: Vec::new(),
            discarding: false,
        })
    }

    pub fn cursor(&self) -> &FileCursor {
        &self.cursor
    }

    /// Run one poll cycle and return the events it produced, in file order.
    ///
    /// Stat or read failures abandon the cycle without moving the cursor.
    pub fn poll(&mut self) -> Vec<LogEvent> {
        let stat = match self.file.stat() {
            Ok(stat) => stat,
            Err(e) => {
                warn!(error = %e, "log stat failed, retrying next cycle");
                return Vec::new();
            }
        };

        match self.cursor.compare(&stat) {
            CursorAction::Unchanged => Vec::new(),
            CursorAction::Truncated { from, to } => {
                info!(
                    path = %self.file.path().display(),
                    from,
                    to,
                    "log file shrank, resetting cursor"
                );
                self.incomplete.clear();
                self.discarding = false;
                self.cursor.advance(stat);
                Vec::new()
            }
            CursorAction::Grew { from, to } => {
                let delta = match self.file.read_range(from, to) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(error = %e, "log read failed, retrying next cycle");
                        return Vec::new();
                    }
                };
                debug!(from, to, bytes = to - from, "read log delta");
                self.cursor.advance(stat);
                self.classify_delta(&delta)
            }
        }
    }

    fn classify_delta(&mut self, mut delta: &[u8]) -> Vec<LogEvent> {
        if self.discarding {
            match delta.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    delta = &delta[i + 1..];
                    self.discarding = false;
                }
                None => return Vec::new(),
            }
        }

        let mut bytes = std::mem::take(&mut self.incomplete);
        bytes.extend_from_slice(delta);

        let complete_len = bytes
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let rest = bytes.split_off(complete_len);
        if rest.len() > MAX_PARTIAL_LINE_BYTES {
            warn!(bytes = rest.len(), "discarding oversized unterminated log line");
            self.discarding = true;
        } else {
            self.incomplete = rest;
        }

        // Only complete lines are decoded, so multi-byte characters are never split.
        let text = String::from_utf8_lossy(&bytes);
        text.lines()
            .filter_map(|line| {
                let event = self.patterns.classify(line);
                if event.is_none() && !line.is_empty() {
                    trace!(line, "unmatched log line");
                }
                event
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::FileStat;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;

    /// Scripted file: each `stat()` pops the next snapshot, reads return `delta`.
    struct MockLogFile {
        stats: Mutex<VecDeque<Option<u64>>>,
        delta: Mutex<Result<Vec<u8>, ()>>,
        reads: Mutex<Vec<(u64, u64)>>,
    }

    impl MockLogFile {
        fn new(initial_size: u64) -> Self {
            Self {
                stats: Mutex::new(VecDeque::from([Some(initial_size)])),
                delta: Mutex::new(Ok(Vec::new())),
                reads: Mutex::new(Vec::new()),
            }
        }

        fn next_size(&self, size: u64) {
            self.stats.lock().expect("lock").push_back(Some(size));
        }

        fn next_stat_fails(&self) {
            self.stats.lock().expect("lock").push_back(None);
        }

        fn set_delta(&self, text: &str) {
            self.set_delta_bytes(text.as_bytes());
        }

        fn set_delta_bytes(&self, bytes: &[u8]) {
            *self.delta.lock().expect("lock") = Ok(bytes.to_vec());
        }

        fn fail_reads(&self) {
            *self.delta.lock().expect("lock") = Err(());
        }

        fn reads(&self) -> Vec<(u64, u64)> {
            self.reads.lock().expect("lock").clone()
        }
    }

    fn io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone")
    }

    impl LogFile for MockLogFile {
        fn path(&self) -> &Path {
            Path::new("mock/latest.log")
        }

        fn stat(&self) -> Result<FileStat, TailError> {
            let next = self.stats.lock().expect("lock").pop_front().flatten();
            match next {
                Some(size) => Ok(FileStat {
                    size,
                    modified_at: Utc
                        .timestamp_opt(i64::try_from(size).expect("small size"), 0)
                        .single()
                        .expect("valid timestamp"),
                }),
                None => Err(TailError::Stat {
                    path: self.path().to_path_buf(),
                    source: io_err(),
                }),
            }
        }

        fn read_range(&self, from: u64, to: u64) -> Result<Vec<u8>, TailError> {
            self.reads.lock().expect("lock").push((from, to));
            match &*self.delta.lock().expect("lock") {
                Ok(bytes) => Ok(bytes.clone()),
                Err(()) => Err(TailError::Read {
                    path: self.path().to_path_buf(),
                    from,
                    to,
                    source: io_err(),
                }),
            }
        }
    }

    fn tail_at(size: u64) -> (Arc<MockLogFile>, LogTail<MockLogFile>) {
        let file = Arc::new(MockLogFile::new(size));
        let tail = LogTail::new(Arc::clone(&file), LogPatterns::default()).expect("seed");
        (file, tail)
    }

    #[test]
    fn seeds_cursor_at_current_size() {
        let (file, tail) = tail_at(100);
        assert_eq!(tail.cursor().last_size(), 100);
        assert!(file.reads().is_empty());
    }

    #[test]
    fn seed_fails_when_file_missing() {
        let file = Arc::new(MockLogFile::new(0));
        file.stats.lock().expect("lock").clear();
        file.next_stat_fails();
        assert!(LogTail::new(file, LogPatterns::default()).is_err());
    }

    #[test]
    fn unchanged_size_does_not_read() {
        let (file, mut tail) = tail_at(50);
        file.next_size(50);
        assert!(tail.poll().is_empty());
        assert!(file.reads().is_empty());
        assert_eq!(tail.cursor().last_size(), 50);
    }

    #[test]
    fn rotation_then_growth() {
        let (file, mut tail) = tail_at(100);

        file.next_size(10);
        assert!(tail.poll().is_empty());
        assert!(file.reads().is_empty(), "truncation must not read");
        assert_eq!(tail.cursor().last_size(), 10);

        file.next_size(20);
        file.set_delta(concat!(
            "\n",
            "INVALID LOG\n",
            "[00:00:00] [Server thread/INFO]: <Bob> hi\n",
            "[00:00:00] [Server thread/INFO]: Alice joined the game\n",
            "[00:00:00] [Server thread/INFO]: Stopping server\n",
            "[00:00:00] [Server thread/INFO]: Stopping the server\n",
        ));
        let events = tail.poll();

        assert_eq!(file.reads(), vec![(10, 20)]);
        assert_eq!(tail.cursor().last_size(), 20);
        assert_eq!(
            events,
            vec![
                LogEvent::Chat {
                    username: "Bob".to_owned(),
                    message: "hi".to_owned(),
                },
                LogEvent::Login {
                    username: "Alice".to_owned(),
                },
                LogEvent::Stop,
            ]
        );
    }

    #[test]
    fn failed_read_keeps_cursor() {
        let (file, mut tail) = tail_at(10);
        file.fail_reads();
        file.next_size(30);
        assert!(tail.poll().is_empty());
        assert_eq!(tail.cursor().last_size(), 10);

        file.set_delta("Stopping server\n");
        file.next_size(30);
        assert_eq!(tail.poll(), vec![LogEvent::Stop]);
        assert_eq!(file.reads(), vec![(10, 30), (10, 30)]);
        assert_eq!(tail.cursor().last_size(), 30);
    }

    #[test]
    fn failed_stat_keeps_cursor() {
        let (file, mut tail) = tail_at(10);
        file.next_stat_fails();
        assert!(tail.poll().is_empty());
        assert_eq!(tail.cursor().last_size(), 10);
        assert!(file.reads().is_empty());
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let (file, mut tail) = tail_at(0);

        file.next_size(8);
        file.set_delta("Stopping");
        assert!(tail.poll().is_empty());

        file.next_size(16);
        file.set_delta(" server\n");
        assert_eq!(tail.poll(), vec![LogEvent::Stop]);
    }

    #[test]
    fn truncation_drops_partial_line() {
        let (file, mut tail) = tail_at(0);

        file.next_size(5);
        file.set_delta("<Bob>");
        assert!(tail.poll().is_empty());

        file.next_size(2);
        assert!(tail.poll().is_empty());

        file.next_size(18);
        file.set_delta("Stopping server\n");
        assert_eq!(tail.poll(), vec![LogEvent::Stop]);
    }

    #[test]
    fn crlf_lines_classify() {
        let (file, mut tail) = tail_at(0);
        file.next_size(40);
        file.set_delta("Alice left the game\r\nStopping server\r\n");
        assert_eq!(
            tail.poll(),
            vec![
                LogEvent::Logout {
                    username: "Alice".to_owned(),
                },
                LogEvent::Stop,
            ]
        );
    }

    #[test]
    fn multibyte_character_split_across_reads() {
        let line = "<Bob> こんにちは\n".as_bytes();
        // Cut one byte into the first three-byte character.
        let cut = "<Bob> ".len() + 1;
        let (file, mut tail) = tail_at(0);

        file.next_size(cut as u64);
        file.set_delta_bytes(&line[..cut]);
        assert!(tail.poll().is_empty());

        file.next_size(line.len() as u64);
        file.set_delta_bytes(&line[cut..]);
        assert_eq!(
            tail.poll(),
            vec![LogEvent::Chat {
                username: "Bob".to_owned(),
                message: "こんにちは".to_owned(),
            }]
        );
    }

    #[test]
    fn oversized_line_remainder_is_skipped() {
        let (file, mut tail) = tail_at(0);
        let long = "x".repeat(MAX_PARTIAL_LINE_BYTES + 1);

        file.next_size(long.len() as u64);
        file.set_delta(&long);
        assert!(tail.poll().is_empty());

        // Still inside the oversized line: nothing is classified.
        file.next_size(long.len() as u64 + 10);
        file.set_delta("xxxxxxxxxx");
        assert!(tail.poll().is_empty());

        // The tail of the oversized line must not look like a stop marker.
        file.next_size(long.len() as u64 + 42);
        file.set_delta("Stopping server\nStopping server\n");
        assert_eq!(tail.poll(), vec![LogEvent::Stop]);
    }

    #[test]
    fn truncation_ends_discarding() {
        let (file, mut tail) = tail_at(0);
        let long = "x".repeat(MAX_PARTIAL_LINE_BYTES + 1);

        file.next_size(long.len() as u64);
        file.set_delta(&long);
        assert!(tail.poll().is_empty());

        file.next_size(0);
        assert!(tail.poll().is_empty());

        file.next_size(16);
        file.set_delta("Stopping server\n");
        assert_eq!(tail.poll(), vec![LogEvent::Stop]);
    }
}
