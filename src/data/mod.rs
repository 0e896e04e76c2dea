/// Data loading modules for classifier training
pub mod tensor_dataset;

pub use tensor_dataset::{ShuffleDataLoader, TensorArchiveDataset, ARCHIVE_FILE_NAME};

use candle_core::{Device, Result, Tensor};

/// Generic data loader trait
pub trait BatchDataLoader {
    /// Get next batch of (images, labels) tensors
    fn next_batch(&mut self, device: &Device) -> Result<Option<(Tensor, Tensor)>>;

    /// Reset loader for new epoch
    fn reset(&mut self);

    /// Get total number of batches
    fn num_batches(&self) -> usize;
}
