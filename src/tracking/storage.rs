/// Tracking storage backends
///
/// Runs persist as one pretty-printed JSON file per run, named
/// `<run_id>.json`, or stay in memory for tests.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Result, Run, TrackingError};

/// Trait for tracking storage backends
pub trait TrackingBackend {
    /// Persist a run
    fn save_run(&mut self, run: &Run) -> Result<()>;

    /// Load a run by its ID
    fn load_run(&self, run_id: &str) -> Result<Run>;

    /// List all stored runs
    fn list_runs(&self) -> Result<Vec<Run>>;
}

/// JSON file-based tracking backend
#[derive(Debug)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }
}

impl TrackingBackend for JsonFileBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(run)?;
        fs::write(self.run_path(&run.run_id), json)?;
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(TrackingError::RunNotFound(run_id.to_string()));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                let json = fs::read_to_string(&path)?;
                runs.push(serde_json::from_str(&json)?);
            }
        }
        runs.sort_by(|a: &Run, b: &Run| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

/// In-memory tracking backend for tests, no persistence
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    runs: HashMap<String, Run>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingBackend for InMemoryBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.runs.values().cloned().collect();
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{ExperimentTracker, RunStatus};

    #[test]
    fn test_json_backend_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let backend = JsonFileBackend::new(dir.path());
        let mut tracker = ExperimentTracker::new("disk-exp", backend);

        let run_id = tracker.start_run(None)?;
        tracker.log_param(&run_id, "batch_size", "64")?;
        tracker.log_metric(&run_id, "loss", 0.9, 1)?;
        tracker.end_run(&run_id, RunStatus::Completed)?;

        // A fresh backend over the same directory sees the persisted run.
        let reloaded = JsonFileBackend::new(dir.path()).load_run(&run_id)?;
        assert_eq!(reloaded.status, RunStatus::Completed);
        assert_eq!(reloaded.params.get("batch_size").map(String::as_str), Some("64"));
        assert_eq!(reloaded.metrics["loss"].len(), 1);
        Ok(())
    }

    #[test]
    fn test_json_backend_missing_run() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert!(backend.load_run("run-1").is_err());
    }

    #[test]
    fn test_json_backend_lists_sorted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut tracker = ExperimentTracker::new("disk-exp", JsonFileBackend::new(dir.path()));
        for _ in 0..3 {
            let id = tracker.start_run(None)?;
            tracker.end_run(&id, RunStatus::Completed)?;
        }

        let runs = JsonFileBackend::new(dir.path()).list_runs()?;
        let ids: Vec<&str> = runs.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids, vec!["run-1", "run-2", "run-3"]);
        Ok(())
    }
}
