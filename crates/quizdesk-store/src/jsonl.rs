//! Append-only JSON-lines results log.
//!
//! Each line is one record: `{"seq": N, "result": {...}}`. Sequence numbers
//! start at 1 and increase by one per append. Appends hold an exclusive
//! advisory lock on the log while they read the tail record and write the
//! next one, so every handle and process sharing the file continues one
//! sequence. Readers take a shared lock.
//!
//! A final line without a newline is a torn write. Readers skip it and the
//! next append truncates it.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use quizdesk_core::model::AttemptResult;
use quizdesk_core::traits::ResultsStore;

use crate::error::StoreError;

const TAIL_CHUNK: u64 = 8 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    seq: u64,
    result: AttemptResult,
}

/// End of the last newline-terminated line, and the last non-blank line
/// before it.
struct Tail {
    complete_len: u64,
    last_line: Option<String>,
}

/// Results store backed by a JSON-lines file.
pub struct JsonlResultsStore {
    path: PathBuf,
}

impl JsonlResultsStore {
    /// Open (without creating) the log at `path`.
    ///
    /// The file and its parent directories are created on the first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records with their sequence numbers, in file order.
    pub fn entries(&self) -> Result<Vec<(u64, AttemptResult)>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to open results log: {}", self.path.display())
                })
            }
        };
        FileExt::lock_shared(&file)
            .with_context(|| format!("failed to lock results log: {}", self.path.display()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("failed to read results log: {}", self.path.display()))?;

        let complete = match content.rfind('\n') {
            Some(pos) => pos + 1,
            None => 0,
        };
        if complete < content.len() {
            tracing::warn!(
                path = %self.path.display(),
                bytes = content.len() - complete,
                "ignoring unterminated final line in results log"
            );
        }

        let mut records = Vec::new();
        for (i, line) in content[..complete].lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(line).map_err(|e| self.corrupt(i + 1, &e))?;
            records.push((record.seq, record.result));
        }
        Ok(records)
    }

    fn corrupt(&self, line: usize, e: &serde_json::Error) -> StoreError {
        StoreError::CorruptRecord {
            path: self.path.clone(),
            line,
            reason: e.to_string(),
        }
    }
}

/// Reads backwards from the end of `file` until the last complete non-blank
/// line is found, without scanning the whole log.
fn read_tail(file: &mut File) -> std::io::Result<Tail> {
    let len = file.metadata()?.len();
    let mut buf: Vec<u8> = Vec::new();
    let mut start = len;
    loop {
        if let Some(tail) = scan_tail(&buf, start) {
            return Ok(tail);
        }
        let from = start.saturating_sub(TAIL_CHUNK);
        let mut chunk = vec![0u8; (start - from) as usize];
        file.seek(SeekFrom::Start(from))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        start = from;
    }
}

/// `buf` holds the file from byte `start` to the end. Returns `None` when
/// more of the file has to be read.
fn scan_tail(buf: &[u8], start: u64) -> Option<Tail> {
    let at_file_start = start == 0;
    let Some(last_newline) = buf.iter().rposition(|b| *b == b'\n') else {
        return at_file_start.then_some(Tail {
            complete_len: 0,
            last_line: None,
        });
    };
    let complete_len = start + last_newline as u64 + 1;

    let mut end = last_newline;
    loop {
        let line_start = match buf[..end].iter().rposition(|b| *b == b'\n') {
            Some(pos) => pos + 1,
            None if at_file_start => 0,
            None => return None,
        };
        let line = &buf[line_start..end];
        if !line.iter().all(u8::is_ascii_whitespace) {
            return Some(Tail {
                complete_len,
                last_line: Some(String::from_utf8_lossy(line).into_owned()),
            });
        }
        if line_start == 0 {
            return Some(Tail {
                complete_len,
                last_line: None,
            });
        }
        end = line_start - 1;
    }
}

/// Number of lines in the first `len` bytes of `file`.
fn count_lines(file: &mut File, len: u64) -> std::io::Result<usize> {
    let mut prefix = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.take(len).read_to_end(&mut prefix)?;
    Ok(prefix.iter().filter(|b| **b == b'\n').count())
}

impl ResultsStore for JsonlResultsStore {
    fn append(&self, result: &AttemptResult) -> Result<u64> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("failed to open results log: {}", self.path.display()))?;
        // Released when `file` is dropped.
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("failed to lock results log: {}", self.path.display()))?;

        let tail = read_tail(&mut file)
            .with_context(|| format!("failed to read results log: {}", self.path.display()))?;
        let len = file.metadata()?.len();
        if tail.complete_len < len {
            tracing::warn!(
                path = %self.path.display(),
                bytes = len - tail.complete_len,
                "truncating unterminated final line in results log"
            );
            file.set_len(tail.complete_len)
                .with_context(|| format!("failed to truncate {}", self.path.display()))?;
        }

        let last = match &tail.last_line {
            Some(last_line) => match serde_json::from_str::<Record>(last_line) {
                Ok(record) => record.seq,
                Err(e) => {
                    let line_no = count_lines(&mut file, tail.complete_len)?;
                    return Err(self.corrupt(line_no, &e).into());
                }
            },
            None => 0,
        };
        let seq = last
            .checked_add(1)
            .ok_or(StoreError::SequenceOverflow(last))?;

        let line = serde_json::to_string(&Record {
            seq,
            result: result.clone(),
        })
        .context("failed to serialize result")?;
        file.write_all(format!("{line}\n").as_bytes())
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        file.flush()?;

        tracing::info!(seq, path = %self.path.display(), "appended result");
        Ok(seq)
    }

    fn query_all(&self) -> Result<Vec<AttemptResult>> {
        Ok(self.entries()?.into_iter().map(|(_, r)| r).collect())
    }
}
