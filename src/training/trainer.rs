/// Training loop for the image classifier
use candle_core::backprop::GradStore;
use candle_core::{DType, Device, Tensor};
use candle_nn::{loss, AdamW, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};

use super::checkpoint;
use crate::config::TrainConfig;
use crate::data::BatchDataLoader;
use crate::models::{Classifier, ClassifierConfig};
use crate::tracking::{ExperimentTracker, TrackingBackend};

/// Optimizer steps between parameter/gradient snapshots sent to the tracker
const WATCH_LOG_EVERY: usize = 100;

/// Trainer for the classifier
///
/// Owns the model, its variables, and the optimizer; drives the fixed-epoch
/// loop and persists the final weights. The tracker handle is passed into
/// [`Trainer::train`] explicitly so the caller controls the run's lifetime.
pub struct Trainer {
    model: Classifier,
    varmap: VarMap,
    optimizer: AdamW,
    config: TrainConfig,
    device: Device,
    step: usize,
}

impl Trainer {
    /// Create new trainer
    pub fn new(
        model_config: ClassifierConfig,
        config: TrainConfig,
        device: Device,
    ) -> crate::Result<Self> {
        config.validate()?;
        model_config.validate()?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = Classifier::new(&model_config, vb)?;

        // Weight decay stays at zero, so this is plain Adam.
        let optimizer_params = ParamsAdamW {
            lr: config.learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay: 0.0,
        };
        let optimizer = AdamW::new(varmap.all_vars(), optimizer_params)?;

        Ok(Self {
            model,
            varmap,
            optimizer,
            config,
            device,
            step: 0,
        })
    }

    /// One optimization step over a batch
    ///
    /// Forward to log-probabilities, NLL loss against the integer labels,
    /// backward, optimizer step. Returns the scalar batch loss. Gradients
    /// are rebuilt from scratch on every backward pass, so there is no
    /// stale-gradient state to clear between batches.
    fn train_step<B: TrackingBackend>(
        &mut self,
        images: &Tensor,
        labels: &Tensor,
        tracker: &mut ExperimentTracker<B>,
        run_id: &str,
    ) -> crate::Result<f32> {
        let log_ps = self.model.forward(images)?;
        let loss = loss::nll(&log_ps, labels)?;
        let grads = loss.backward()?;

        self.step += 1;
        if self.step % WATCH_LOG_EVERY == 0 {
            self.log_watch_snapshot(&grads, tracker, run_id)?;
        }
        self.optimizer.step(&grads)?;

        let loss_val = loss.to_scalar::<f32>()?;
        // One raw loss event per batch, unaggregated.
        tracker.log_metric(run_id, "loss", loss_val as f64, self.step as u64)?;

        Ok(loss_val)
    }

    /// L2 norms of every parameter and its gradient
    fn log_watch_snapshot<B: TrackingBackend>(
        &self,
        grads: &GradStore,
        tracker: &mut ExperimentTracker<B>,
        run_id: &str,
    ) -> crate::Result<()> {
        let step = self.step as u64;
        for (name, var) in self.varmap.data().lock().unwrap().iter() {
            let param_norm = l2_norm(var.as_tensor())?;
            tracker.log_metric(run_id, &format!("param_norm/{name}"), param_norm, step)?;
            if let Some(grad) = grads.get(var.as_tensor()) {
                let grad_norm = l2_norm(grad)?;
                tracker.log_metric(run_id, &format!("grad_norm/{name}"), grad_norm, step)?;
            }
        }
        Ok(())
    }

    /// Train for one epoch, returning the mean batch loss
    pub fn train_epoch<B: TrackingBackend>(
        &mut self,
        loader: &mut impl BatchDataLoader,
        tracker: &mut ExperimentTracker<B>,
        run_id: &str,
    ) -> crate::Result<f32> {
        let mut epoch_loss = 0.0f32;
        let mut num_batches = 0usize;

        // Reset reshuffles the sample order for this epoch.
        loader.reset();
        while let Some((images, labels)) = loader.next_batch(&self.device)? {
            epoch_loss += self.train_step(&images, &labels, tracker, run_id)?;
            num_batches += 1;
        }

        if num_batches == 0 {
            return Err(crate::TrainError::Dataset(
                "loader produced no batches; the training split is empty".to_string(),
            ));
        }

        Ok(epoch_loss / num_batches as f32)
    }

    /// Full training loop
    ///
    /// Runs the fixed number of epochs, logs the per-epoch mean loss, saves
    /// the final weights to the configured checkpoint path, and returns the
    /// loss history (one entry per epoch).
    pub fn train<B: TrackingBackend>(
        &mut self,
        loader: &mut impl BatchDataLoader,
        tracker: &mut ExperimentTracker<B>,
        run_id: &str,
    ) -> crate::Result<Vec<f32>> {
        log::info!(
            "Starting training: {} epochs, {} batches per epoch, lr={}",
            self.config.epochs,
            loader.num_batches(),
            self.config.learning_rate
        );

        let mut train_losses = Vec::with_capacity(self.config.epochs);
        for epoch in 0..self.config.epochs {
            let mean_loss = self.train_epoch(loader, tracker, run_id)?;
            train_losses.push(mean_loss);
            tracker.log_metric(run_id, "epoch_loss", mean_loss as f64, (epoch + 1) as u64)?;
            println!("Train loss in epoch {}: {}", epoch, mean_loss);
        }

        checkpoint::save_weights(&self.varmap, &self.config.checkpoint_path)?;
        tracker.log_artifact(run_id, &self.config.checkpoint_path)?;
        log::info!("Saved model weights to {}", self.config.checkpoint_path);

        Ok(train_losses)
    }
}

fn l2_norm(tensor: &Tensor) -> candle_core::Result<f64> {
    let norm = tensor.sqr()?.sum_all()?.sqrt()?.to_scalar::<f32>()?;
    Ok(norm as f64)
}
