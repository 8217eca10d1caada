//! Durable, append-only event journal.
//!
//! Each line is one JSON-encoded [`Event`]; `seq` is assigned on append and
//! is local to this journal file — a replicated event keeps its own
//! `origin_event_id` but gets a fresh local `seq` when it lands here.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use thrum_core::Event;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One journal line, once decoded.
#[derive(Debug, Clone)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// Number of buffered appends before `needs_flush` recommends an fsync.
const FLUSH_THRESHOLD: usize = 100;

/// Append-only journal file, kept open for the lifetime of the daemon.
///
/// `write_seq` is the last sequence number appended; `processed_seq` is the
/// last one folded into a snapshot. On recovery the daemon replays entries
/// with `seq > processed_seq`.
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    pending_since_flush: usize,
    last_flush: Instant,
}

impl Wal {
    /// Open (creating if absent) the journal at `path`, discarding any
    /// trailing corrupt line and rotating it to a `.bak` file.
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (write_seq, corrupt_tail) = scan(path)?;
        if corrupt_tail {
            repair(path)?;
        }

        let file = OpenOptions::new().create(true).append(true).read(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_seq,
            processed_seq,
            pending_since_flush: 0,
            last_flush: Instant::now(),
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append one event, returning the sequence number it was assigned.
    /// Does not fsync — call [`Self::flush`] or rely on [`Self::needs_flush`].
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let line = serde_json::to_string(&WalLine { seq: self.write_seq, event: event.clone() })?;
        writeln!(self.file, "{line}")?;
        self.pending_since_flush += 1;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.pending_since_flush = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Whether enough unflushed writes (or enough time) have accumulated
    /// that the caller should call [`Self::flush`].
    pub fn needs_flush(&self) -> bool {
        self.pending_since_flush >= FLUSH_THRESHOLD
            || (self.pending_since_flush > 0 && self.last_flush.elapsed().as_secs() >= 1)
    }

    /// Mark `seq` as folded into the latest snapshot, advancing the replay
    /// start point for future opens.
    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// The next entry after `processed_seq` that hasn't been consumed yet,
    /// or `None` if the journal is caught up.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let entries = self.entries_after(self.processed_seq)?;
        Ok(entries.into_iter().next())
    }

    /// All entries with `seq > after`, in order.
    pub fn entries_after(&mut self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        self.file.seek(SeekFrom::Start(0))?;
        let reader = BufReader::new(&self.file);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let decoded: WalLine = serde_json::from_str(&line)?;
            if decoded.seq > after {
                out.push(WalEntry { seq: decoded.seq, event: decoded.event });
            }
        }
        Ok(out)
    }

    /// Rewrite the journal keeping only entries with `seq >= floor`,
    /// called after a snapshot makes earlier entries redundant.
    pub fn truncate_before(&mut self, floor: u64) -> Result<(), WalError> {
        let kept = self.entries_after(floor.saturating_sub(1))?;
        let tmp = self.path.with_extension("wal.tmp");
        {
            let mut f = File::create(&tmp)?;
            for entry in &kept {
                let line = serde_json::to_string(&WalLine { seq: entry.seq, event: entry.event.clone() })?;
                writeln!(f, "{line}")?;
            }
            f.flush()?;
            f.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().create(true).append(true).read(true).open(&self.path)?;
        Ok(())
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct WalLine {
    seq: u64,
    event: Event,
}

/// Reads every valid line, returning the highest `seq` seen and whether a
/// trailing line failed to parse (signalling truncated/corrupt writes).
fn scan(path: &Path) -> Result<(u64, bool), WalError> {
    if !path.exists() {
        return Ok((0, false));
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut max_seq = 0;
    let mut corrupt = false;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<WalLine>(&line) {
            Ok(decoded) => {
                max_seq = max_seq.max(decoded.seq);
                corrupt = false;
            }
            Err(_) => corrupt = true,
        }
    }
    Ok((max_seq, corrupt))
}

/// Rotates the current file to `.bak` (rotating any existing `.bak` out of
/// the way first) and rewrites it with only the lines that parse.
fn repair(path: &Path) -> Result<(), WalError> {
    let bak = path.with_extension("bak");
    if bak.exists() {
        let _ = std::fs::remove_file(&bak);
    }
    std::fs::copy(path, &bak)?;

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut valid_lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if serde_json::from_str::<WalLine>(&line).is_ok() {
            valid_lines.push(line);
        } else {
            break;
        }
    }

    let mut f = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    for line in valid_lines {
        writeln!(f, "{line}")?;
    }
    f.flush()?;
    tracing::warn!(path = %path.display(), "recovered journal after trailing corrupt entry");
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
