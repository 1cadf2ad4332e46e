//! Append-only feedback log, one JSON object per line.
//!
//! Appends are serialized through a mutex and each record is written with a
//! single `write_all`, so concurrent callers never interleave partial lines.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::types::DocMeta;

/// Thumbs up / thumbs down, stored as `1` / `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Unhelpful,
    Helpful,
}

impl Serialize for Feedback {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Feedback::Unhelpful => 0,
            Feedback::Helpful => 1,
        })
    }
}

impl<'de> Deserialize<'de> for Feedback {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Feedback::Unhelpful),
            1 => Ok(Feedback::Helpful),
            other => Err(serde::de::Error::custom(format!("feedback must be 0 or 1, got {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub query: String,
    pub answer: String,
    pub feedback: Feedback,
    pub context_docs: Vec<DocMeta>,
    pub user_pref: String,
}

pub struct FeedbackLog {
    path: PathBuf,
    writer: Mutex<File>,
}

impl FeedbackLog {
    /// Opens (creating if needed) the log at `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { path: path.to_path_buf(), writer: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = self
            .writer
            .lock()
            .map_err(|_| Error::Io(std::io::Error::other("feedback log writer lock poisoned")))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Reads every record back, in append order.
    pub fn read_all(path: &Path) -> Result<Vec<FeedbackRecord>> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}
