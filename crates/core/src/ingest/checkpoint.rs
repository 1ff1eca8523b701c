//! Durable run progress for crash-safe resume.
//!
//! The checkpoint is saved after every per-source transition, so a crash
//! loses at most the in-flight source's progress. It is deleted only when a
//! run finishes with zero failed sources; otherwise it stays on disk and
//! the next run resumes from it.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionCheckpoint {
    pub execution_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_sources: Vec<String>,
    pub failed_sources: BTreeMap<String, String>,
    pub current_source: Option<String>,
    pub current_batch: u32,
    pub total_processed: u64,
}

impl ExecutionCheckpoint {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            started_at: Utc::now(),
            completed_sources: Vec::new(),
            failed_sources: BTreeMap::new(),
            current_source: None,
            current_batch: 0,
            total_processed: 0,
        }
    }

    pub fn is_source_completed(&self, code: &str) -> bool {
        self.completed_sources.iter().any(|s| s == code)
    }

    /// Records a source as done; a retried source leaves the failed map.
    pub fn mark_completed(&mut self, code: &str) {
        if !self.is_source_completed(code) {
            self.completed_sources.push(code.to_string());
        }
        self.failed_sources.remove(code);
        self.current_source = None;
    }

    pub fn mark_failed(&mut self, code: &str, error: String) {
        self.failed_sources.insert(code.to_string(), error);
        self.current_source = None;
    }
}

/// Explicit collaborator for checkpoint persistence, injected into the
/// orchestrator so tests can run against an in-memory store.
pub trait CheckpointStore: Send + Sync {
    fn load(&self) -> Result<Option<ExecutionCheckpoint>>;
    fn save(&self, checkpoint: &ExecutionCheckpoint) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON-file checkpoint store. Writes go through a sibling temp file and a
/// rename so a crash mid-save never leaves a half-written checkpoint.
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<Option<ExecutionCheckpoint>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let checkpoint = serde_json::from_str(&contents).map_err(|e| {
            Error::Unexpected(format!(
                "corrupt checkpoint file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(checkpoint))
    }

    fn save(&self, checkpoint: &ExecutionCheckpoint) -> Result<()> {
        let contents = serde_json::to_vec_pretty(checkpoint)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory checkpoint store for tests.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    inner: Mutex<Option<ExecutionCheckpoint>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn load(&self) -> Result<Option<ExecutionCheckpoint>> {
        Ok(self.inner.lock().expect("checkpoint lock poisoned").clone())
    }

    fn save(&self, checkpoint: &ExecutionCheckpoint) -> Result<()> {
        *self.inner.lock().expect("checkpoint lock poisoned") = Some(checkpoint.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().expect("checkpoint lock poisoned") = None;
        Ok(())
    }
}
