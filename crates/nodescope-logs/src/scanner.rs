use std::borrow::Cow;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::filter::QueryChain;
use crate::parser::{EntryHeader, LineClassifier, LineKind};
use nodescope_types::Entry;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to read {} after line {line}: {source}", .path.display())]
    Read {
        path: PathBuf,
        line: u64,
        source: io::Error,
    },

    #[error("entry channel closed")]
    ChannelClosed,

    #[error("scanner task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Counters for a single scan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Physical lines read
    pub lines: u64,

    /// Entries that passed the query and were sent
    pub emitted: u64,

    /// Header-shaped lines dropped for a bad level or timestamp
    pub malformed: u64,
}

/// Rebuilds entries from one node's log file and sends the matching ones
pub struct SourceScanner {
    address: String,
    path: PathBuf,
    query: Arc<QueryChain>,
}

impl SourceScanner {
    pub fn new(address: impl Into<String>, path: impl Into<PathBuf>, query: Arc<QueryChain>) -> Self {
        Self {
            address: address.into(),
            path: path.into(),
            query,
        }
    }

    /// Open the log file and scan it
    pub async fn scan_file(&self, tx: &mpsc::Sender<Entry>) -> Result<ScanStats, ScanError> {
        let file = File::open(&self.path)
            .await
            .map_err(|source| ScanError::Open {
                path: self.path.clone(),
                source,
            })?;
        self.scan(BufReader::new(file), tx).await
    }

    /// Scan any buffered reader line by line
    ///
    /// Lines that do not start with a word token are appended to the pending
    /// entry. Any other line closes the pending entry and, if it carries a
    /// valid level and timestamp, opens the next one. Entries already sent
    /// stay sent when a read error cuts the scan short; the pending entry is
    /// flushed before the error is returned.
    pub async fn scan<R>(&self, mut reader: R, tx: &mpsc::Sender<Entry>) -> Result<ScanStats, ScanError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut stats = ScanStats::default();
        let mut pending: Option<Entry> = None;
        let mut buf = Vec::new();
        let mut read_error = None;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
            stats.lines += 1;
            let line = decode_line(&buf);

            if let Some(entry) = pending.as_mut() {
                if !LineClassifier::is_header_shaped(&line) {
                    entry.push_line(&line);
                    continue;
                }
            }

            if let Some(entry) = pending.take() {
                self.finish(entry, tx, &mut stats).await?;
            }

            let kind = LineClassifier::classify(&line);
            match kind {
                LineKind::Header(header) => {
                    pending = Some(self.start_entry(header, stats.lines, line.into_owned()));
                }
                LineKind::Malformed(e) => {
                    stats.malformed += 1;
                    tracing::trace!(
                        node = %self.address,
                        line = stats.lines,
                        error = %e,
                        "dropping malformed header"
                    );
                }
                LineKind::Continuation => {}
            }
        }

        if let Some(entry) = pending.take() {
            self.finish(entry, tx, &mut stats).await?;
        }

        if let Some(source) = read_error {
            return Err(ScanError::Read {
                path: self.path.clone(),
                line: stats.lines,
                source,
            });
        }

        tracing::debug!(
            node = %self.address,
            path = %self.path.display(),
            lines = stats.lines,
            emitted = stats.emitted,
            malformed = stats.malformed,
            "scan finished"
        );
        Ok(stats)
    }

    fn start_entry(&self, header: EntryHeader, line_number: u64, text: String) -> Entry {
        Entry {
            severity: header.severity,
            timestamp: header.timestamp,
            line_number,
            source_address: self.address.clone(),
            origin_path: self.path.clone(),
            text,
        }
    }

    async fn finish(
        &self,
        entry: Entry,
        tx: &mpsc::Sender<Entry>,
        stats: &mut ScanStats,
    ) -> Result<(), ScanError> {
        if !self.query.matches(&entry.text) {
            return Ok(());
        }
        tx.send(entry).await.map_err(|_| ScanError::ChannelClosed)?;
        stats.emitted += 1;
        Ok(())
    }
}

/// Strip the line terminator and decode, replacing invalid UTF-8
fn decode_line(buf: &[u8]) -> Cow<'_, str> {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}
