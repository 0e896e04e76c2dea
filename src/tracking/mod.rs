/// Experiment tracking for training runs
///
/// An [`ExperimentTracker`] manages runs under one experiment name. A run
/// accumulates hyperparameters, append-only metric series, and artifact
/// paths while active, then is persisted through a pluggable
/// [`TrackingBackend`] when it ends.
pub mod storage;

pub use storage::{InMemoryBackend, JsonFileBackend, TrackingBackend};

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Errors from tracking operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("run is not active: {0}")]
    RunNotActive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Status of a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is actively recording
    Active,
    /// Run completed successfully
    Completed,
    /// Run failed
    Failed,
}

/// One metric data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub value: f64,
    pub step: u64,
}

/// A single experiment run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier within the tracker
    pub run_id: String,
    /// Optional human-readable name
    pub run_name: Option<String>,
    /// Parent experiment name
    pub experiment_name: String,
    /// Current status
    pub status: RunStatus,
    /// Hyperparameters, string-encoded
    pub params: HashMap<String, String>,
    /// Metric series: key -> ordered data points
    pub metrics: HashMap<String, Vec<MetricPoint>>,
    /// Artifact paths
    pub artifacts: Vec<String>,
    /// Unix timestamp (ms) when the run started
    pub start_time_ms: u64,
    /// Unix timestamp (ms) when the run ended
    pub end_time_ms: Option<u64>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Run {
    fn new(run_id: String, run_name: Option<String>, experiment_name: String) -> Self {
        Self {
            run_id,
            run_name,
            experiment_name,
            status: RunStatus::Active,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
            start_time_ms: now_ms(),
            end_time_ms: None,
        }
    }
}

/// Experiment tracker
///
/// Active runs are held in memory for fast mutation and written to the
/// backend once when they end.
#[derive(Debug)]
pub struct ExperimentTracker<B: TrackingBackend> {
    experiment_name: String,
    backend: B,
    active_runs: HashMap<String, Run>,
    next_run_id: u64,
}

impl<B: TrackingBackend> ExperimentTracker<B> {
    /// Create a new tracker for the given experiment name
    pub fn new(experiment_name: impl Into<String>, backend: B) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            backend,
            active_runs: HashMap::new(),
            next_run_id: 1,
        }
    }

    /// Get the experiment name
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Start a new run, returning its ID
    pub fn start_run(&mut self, run_name: Option<&str>) -> Result<String> {
        let run_id = format!("run-{}", self.next_run_id);
        self.next_run_id += 1;

        let run = Run::new(
            run_id.clone(),
            run_name.map(String::from),
            self.experiment_name.clone(),
        );
        self.active_runs.insert(run_id.clone(), run);
        Ok(run_id)
    }

    fn active_run_mut(&mut self, run_id: &str) -> Result<&mut Run> {
        self.active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))
    }

    /// Log a single hyperparameter
    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.active_run_mut(run_id)?
            .params
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Log multiple hyperparameters at once
    pub fn log_params(&mut self, run_id: &str, params: &HashMap<String, String>) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        for (k, v) in params {
            run.params.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    /// Append a metric value at a given step
    pub fn log_metric(&mut self, run_id: &str, key: &str, value: f64, step: u64) -> Result<()> {
        self.active_run_mut(run_id)?
            .metrics
            .entry(key.to_string())
            .or_default()
            .push(MetricPoint { value, step });
        Ok(())
    }

    /// Register an artifact path with the run
    pub fn log_artifact(&mut self, run_id: &str, path: &str) -> Result<()> {
        self.active_run_mut(run_id)?
            .artifacts
            .push(path.to_string());
        Ok(())
    }

    /// End a run with the given status, persisting it to the backend
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut run = self
            .active_runs
            .remove(run_id)
            .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))?;

        run.status = status;
        run.end_time_ms = Some(now_ms());

        self.backend.save_run(&run)
    }

    /// Retrieve a run by ID, checking active runs before the backend
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        if let Some(run) = self.active_runs.get(run_id) {
            return Ok(run.clone());
        }
        self.backend.load_run(run_id)
    }

    /// List all runs (active + persisted), ordered by run ID
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.active_runs.values().cloned().collect();
        for run in self.backend.list_runs()? {
            if !self.active_runs.contains_key(&run.run_id) {
                runs.push(run);
            }
        }
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_records_params_and_metrics() -> Result<()> {
        let mut tracker = ExperimentTracker::new("test-exp", InMemoryBackend::new());
        let run_id = tracker.start_run(Some("baseline"))?;

        tracker.log_param(&run_id, "learning_rate", "0.01")?;
        tracker.log_metric(&run_id, "loss", 2.3, 1)?;
        tracker.log_metric(&run_id, "loss", 1.7, 2)?;
        tracker.log_artifact(&run_id, "models/my_trained_model.safetensors")?;

        let run = tracker.get_run(&run_id)?;
        assert_eq!(run.experiment_name, "test-exp");
        assert_eq!(
            run.params.get("learning_rate").map(String::as_str),
            Some("0.01")
        );
        let loss = &run.metrics["loss"];
        assert_eq!(loss.len(), 2);
        assert_eq!(loss[0], MetricPoint { value: 2.3, step: 1 });
        assert_eq!(loss[1], MetricPoint { value: 1.7, step: 2 });
        assert_eq!(run.artifacts.len(), 1);
        Ok(())
    }

    #[test]
    fn test_ended_run_rejects_logging() -> Result<()> {
        let mut tracker = ExperimentTracker::new("test-exp", InMemoryBackend::new());
        let run_id = tracker.start_run(None)?;
        tracker.end_run(&run_id, RunStatus::Completed)?;

        assert!(tracker.log_metric(&run_id, "loss", 0.1, 1).is_err());

        // The persisted run is still readable through the backend.
        let run = tracker.get_run(&run_id)?;
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.end_time_ms.is_some());
        Ok(())
    }

    #[test]
    fn test_list_runs_merges_active_and_persisted() -> Result<()> {
        let mut tracker = ExperimentTracker::new("test-exp", InMemoryBackend::new());
        let first = tracker.start_run(None)?;
        tracker.end_run(&first, RunStatus::Failed)?;
        let _second = tracker.start_run(None)?;

        let runs = tracker.list_runs()?;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id, "run-1");
        assert_eq!(runs[0].status, RunStatus::Failed);
        assert_eq!(runs[1].run_id, "run-2");
        assert_eq!(runs[1].status, RunStatus::Active);
        Ok(())
    }

    #[test]
    fn test_unknown_run_fails() {
        let tracker: ExperimentTracker<InMemoryBackend> =
            ExperimentTracker::new("test-exp", InMemoryBackend::new());
        assert!(tracker.get_run("run-99").is_err());
    }
}
