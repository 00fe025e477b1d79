//! Inference Log

use crate::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// One served prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRecord {
    pub timestamp: DateTime<Utc>,
    /// Request vector in contract order
    pub features: Vec<f64>,
    pub prediction: u8,
    pub probability: f64,
}

impl InferenceRecord {
    /// Record stamped with the current time
    pub fn new(features: Vec<f64>, prediction: u8, probability: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            features,
            prediction,
            probability,
        }
    }
}

/// Appends records to a JSONL file, one line per prediction
pub struct InferenceLogger {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    written: AtomicUsize,
}

impl InferenceLogger {
    /// Open (or create) the log, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("Inference log opened at {}", path.display());

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            written: AtomicUsize::new(0),
        })
    }

    /// Append one record and flush it
    pub fn append(&self, record: &InferenceRecord) -> Result<(), StorageError> {
        let line = serde_json::to_string(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut writer = self.writer.lock().map_err(|_| StorageError::LockPoisoned)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        let count = self.written.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Logged inference #{}", count);
        Ok(())
    }

    /// Log file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended by this logger since it was opened
    pub fn records_written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }
}

/// Read every record from a log file, skipping blank lines
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<InferenceRecord>, StorageError> {
    let file = File::open(path.as_ref())?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| StorageError::MalformedEntry {
            line: idx + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    debug!("Read {} inference records", records.len());
    Ok(records)
}
