/// Train the MNIST classifier on the preprocessed tensor archive
use candle_core::Device;
use clap::Parser;
use std::path::Path;

use mnist_trainer::config::TrainConfig;
use mnist_trainer::data::{ShuffleDataLoader, TensorArchiveDataset};
use mnist_trainer::models::ClassifierConfig;
use mnist_trainer::plot::render_loss_curve;
use mnist_trainer::tracking::{ExperimentTracker, JsonFileBackend, RunStatus, TrackingBackend};
use mnist_trainer::training::Trainer;

const EXPERIMENT_NAME: &str = "MNIST Experiment";

#[derive(Parser, Debug)]
#[command(name = "train", about = "Train the MNIST classifier")]
struct Cli {
    /// Learning rate to use for training
    #[arg(long, default_value_t = 1e-2)]
    lr: f64,
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let config = TrainConfig {
        learning_rate: args.lr,
        ..Default::default()
    };
    config.validate()?;

    // Device setup - try CUDA first, fall back to CPU
    let device = if candle_core::utils::cuda_is_available() {
        Device::new_cuda(0)?
    } else {
        Device::Cpu
    };
    log::info!("Using device: {:?}", device);
    log::info!("Training with learning rate {}", config.learning_rate);

    let mut tracker = ExperimentTracker::new(
        EXPERIMENT_NAME,
        JsonFileBackend::new(&config.runs_dir),
    );
    let run_id = tracker.start_run(None)?;
    tracker.log_params(&run_id, &config.as_params())?;

    // The run is closed on both exit paths so the tracker record is always
    // flushed before any error surfaces.
    let result = run_training(&config, &device, &mut tracker, &run_id);
    let status = if result.is_ok() {
        RunStatus::Completed
    } else {
        RunStatus::Failed
    };
    tracker.end_run(&run_id, status)?;

    result
}

fn run_training<B: TrackingBackend>(
    config: &TrainConfig,
    device: &Device,
    tracker: &mut ExperimentTracker<B>,
    run_id: &str,
) -> anyhow::Result<()> {
    let dataset = TensorArchiveDataset::from_directory(&config.data_dir, true, device)?;
    let mut loader = ShuffleDataLoader::new(dataset, config.batch_size, true);

    let mut trainer = Trainer::new(ClassifierConfig::default(), config.clone(), device.clone())?;
    let train_losses = trainer.train(&mut loader, tracker, run_id)?;

    render_loss_curve(&train_losses, Path::new(&config.plot_path))?;
    println!("Loss curve written to {}", config.plot_path);

    Ok(())
}
