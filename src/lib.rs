//! MNIST classifier training pipeline
//!
//! Trains a small image classifier on a preprocessed tensor archive:
//! the archive is wrapped in a dataset adapter, batched through a
//! shuffling loader, and driven through a fixed-epoch loop that logs to
//! an experiment tracker and checkpoints the final weights.
//!
//! # Example
//!
//! ```ignore
//! use mnist_trainer::config::TrainConfig;
//! use mnist_trainer::data::{ShuffleDataLoader, TensorArchiveDataset};
//! use mnist_trainer::training::Trainer;
//!
//! let config = TrainConfig::default();
//! let dataset = TensorArchiveDataset::from_directory("data/processed", true, &device)?;
//! let mut loader = ShuffleDataLoader::new(dataset, config.batch_size, true);
//! let mut trainer = Trainer::new(ClassifierConfig::default(), config, device)?;
//! let losses = trainer.train(&mut loader, &mut tracker, &run_id)?;
//! ```

pub mod config;
pub mod data;
pub mod models;
pub mod plot;
pub mod tracking;
pub mod training;

// Re-export commonly used items
pub use config::TrainConfig;
pub use models::Classifier;

/// Library error types
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Tracking error: {0}")]
    Tracking(#[from] tracking::TrackingError),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainError>;
