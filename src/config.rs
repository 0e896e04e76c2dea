/// Run configuration for classifier training
///
/// One record is the single source of truth for the hyperparameters: the
/// trainer reads them from here and the tracker logs them from here, so the
/// values that run are always the values that are recorded.
use std::collections::HashMap;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TrainConfig {
    /// Number of training epochs
    pub epochs: usize,

    /// Samples per batch (final partial batch included)
    pub batch_size: usize,

    /// Learning rate for the Adam optimizer
    pub learning_rate: f64,

    /// Directory holding the preprocessed tensor archive
    pub data_dir: String,

    /// Output path for the final model weights, overwritten every run
    pub checkpoint_path: String,

    /// Output path for the loss-curve plot
    pub plot_path: String,

    /// Directory where tracker runs are persisted
    pub runs_dir: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 30,
            batch_size: 64,
            learning_rate: 1e-2,
            data_dir: "data/processed".to_string(),
            checkpoint_path: "models/my_trained_model.safetensors".to_string(),
            plot_path: "reports/loss_curve.png".to_string(),
            runs_dir: "runs".to_string(),
        }
    }
}

impl TrainConfig {
    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.epochs == 0 {
            return Err(crate::TrainError::Config("epochs must be > 0".to_string()));
        }

        if self.batch_size == 0 {
            return Err(crate::TrainError::Config(
                "batch_size must be > 0".to_string(),
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(crate::TrainError::Config(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }

        Ok(())
    }

    /// Hyperparameters as string pairs for the experiment tracker
    ///
    /// Mirrors the run-level configuration record the tracker expects:
    /// epoch count, batch size, and learning rate.
    pub fn as_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("epochs".to_string(), self.epochs.to_string());
        params.insert("batch_size".to_string(), self.batch_size.to_string());
        params.insert(
            "learning_rate".to_string(),
            self.learning_rate.to_string(),
        );
        params
    }
}
