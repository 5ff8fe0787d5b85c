// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL journal of history records.
//!
//! Every append is flushed and fsynced before returning: the executor relies
//! on a step's about-to-apply marker being durable before the step runs, so
//! there is no write buffering here.
//!
//! Each entry is a single line of JSON: `{"seq":N,"record":{...}}\n`

use crate::state::HistoryRecord;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur in journal operations
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialization helper for writing entries without cloning the record.
#[derive(Serialize)]
struct JournalRecordRef<'a> {
    seq: u64,
    record: &'a HistoryRecord,
}

/// Deserialization helper for reading entries.
#[derive(Deserialize)]
struct JournalRecord {
    seq: u64,
    record: HistoryRecord,
}

/// Append-only journal for one target's history.
pub struct Journal {
    file: File,
    path: PathBuf,
    /// Next sequence number to assign
    next_seq: u64,
}

impl Journal {
    /// Open or create a journal, returning it along with the records read.
    ///
    /// A corrupt tail (truncated write from a crash) rotates the file to
    /// `.bak` and rewrites the valid prefix, so replay always sees a clean
    /// record sequence.
    pub fn open(path: &Path) -> Result<(Self, Vec<HistoryRecord>), JournalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (records, valid_lines, corrupt) = match File::open(path) {
            Ok(file) => Self::scan(&file)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => (Vec::new(), Vec::new(), false),
            Err(e) => return Err(e.into()),
        };

        if corrupt {
            let bak_path = rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_records = records.len(),
                "Corrupt journal tail detected, rotating to .bak and preserving valid prefix",
            );
            std::fs::rename(path, &bak_path)?;

            let mut file = File::create(path)?;
            for line in &valid_lines {
                file.write_all(line.as_bytes())?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok((
            Self {
                file,
                path: path.to_path_buf(),
                next_seq: records.len() as u64 + 1,
            },
            records,
        ))
    }

    /// Append one record, durably.
    pub fn append(&mut self, record: &HistoryRecord) -> Result<(), JournalError> {
        let line = serde_json::to_string(&JournalRecordRef {
            seq: self.next_seq,
            record,
        })?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        self.file.sync_all()?;
        self.next_seq += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records, stopping at the first corrupt line.
    ///
    /// Returns the parsed records, their raw lines (for rewrite), and
    /// whether a corrupt line was found.
    fn scan(file: &File) -> Result<(Vec<HistoryRecord>, Vec<String>, bool), JournalError> {
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut valid_lines = Vec::new();
        let mut expected_seq = 1u64;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(&line) {
                Ok(parsed) if parsed.seq == expected_seq => {
                    expected_seq += 1;
                    records.push(parsed.record);
                    valid_lines.push(line);
                }
                Ok(parsed) => {
                    warn!(
                        expected = expected_seq,
                        found = parsed.seq,
                        "Journal sequence gap, truncating at gap",
                    );
                    return Ok((records, valid_lines, true));
                }
                Err(_) => {
                    return Ok((records, valid_lines, true));
                }
            }
        }

        Ok((records, valid_lines, false))
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let first = path.with_extension("bak");
    if !first.exists() {
        return first;
    }
    for n in 2..=MAX_BAK_FILES {
        let candidate = path.with_extension(format!("bak.{}", n));
        if !candidate.exists() {
            return candidate;
        }
    }
    // All slots taken: recycle the oldest.
    let _ = std::fs::remove_file(&first);
    first
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
