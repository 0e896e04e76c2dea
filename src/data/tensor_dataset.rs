/// Dataset adapter for preprocessed tensor archives (safetensors format)
use candle_core::{DType, Device, Result, Tensor};
use std::collections::HashMap;
use std::path::Path;

/// File name of the preprocessed archive inside the data directory
pub const ARCHIVE_FILE_NAME: &str = "train_test_processed.safetensors";

/// Number of label classes (digits 0-9)
pub const NUM_CLASSES: usize = 10;

/// Dataset over one split of a preprocessed tensor archive
///
/// The archive bundles four named tensors: `train_data`, `train_labels`,
/// `test_data`, `test_labels`. The adapter reads the archive once at
/// construction and retains only the (images, labels) pair selected by the
/// `train` flag. Immutable afterwards.
pub struct TensorArchiveDataset {
    images: Tensor, // [N, ...], F32
    labels: Tensor, // [N], U32
}

fn take_tensor(
    tensors: &mut HashMap<String, Tensor>,
    key: &str,
    path: &Path,
) -> crate::Result<Tensor> {
    tensors.remove(key).ok_or_else(|| {
        crate::TrainError::Dataset(format!("archive {:?} is missing tensor {:?}", path, key))
    })
}

impl TensorArchiveDataset {
    /// Load the archive from a directory and select one split
    ///
    /// # Arguments
    /// * `dir` - Directory containing the archive file
    /// * `train` - Select the training split if true, the test split otherwise
    /// * `device` - Device to hold the split tensors on
    pub fn from_directory<P: AsRef<Path>>(
        dir: P,
        train: bool,
        device: &Device,
    ) -> crate::Result<Self> {
        let path = dir.as_ref().join(ARCHIVE_FILE_NAME);
        if !path.exists() {
            return Err(crate::TrainError::Dataset(format!(
                "archive not found at {:?}",
                path
            )));
        }

        log::info!("Loading tensor archive from: {:?}", path);
        let mut tensors = candle_core::safetensors::load(&path, device)?;

        // One deserialization materializes all four tensors; the unselected
        // pair is dropped here.
        let (images, labels) = if train {
            (
                take_tensor(&mut tensors, "train_data", &path)?,
                take_tensor(&mut tensors, "train_labels", &path)?,
            )
        } else {
            (
                take_tensor(&mut tensors, "test_data", &path)?,
                take_tensor(&mut tensors, "test_labels", &path)?,
            )
        };

        let images = images.to_dtype(DType::F32)?;
        let labels = labels.to_dtype(DType::U32)?.flatten_all()?;

        if images.dim(0)? != labels.dim(0)? {
            return Err(crate::TrainError::Dataset(format!(
                "sample count mismatch: {} images vs {} labels",
                images.dim(0)?,
                labels.dim(0)?
            )));
        }

        log::info!(
            "Split loaded: {} samples, image dims {:?}",
            images.dim(0)?,
            &images.dims()[1..]
        );

        Ok(Self { images, labels })
    }

    /// Number of samples in the retained split
    pub fn len(&self) -> usize {
        self.images.dims()[0]
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-sample image dimensions (first axis stripped)
    pub fn image_dims(&self) -> &[usize] {
        &self.images.dims()[1..]
    }

    /// Number of label classes
    pub fn num_classes(&self) -> usize {
        NUM_CLASSES
    }

    /// Get one `(image, class index)` sample by index
    ///
    /// Fails on an index outside `[0, len())` and on a label outside the
    /// class space.
    pub fn get(&self, index: usize) -> crate::Result<(Tensor, u32)> {
        if index >= self.len() {
            return Err(crate::TrainError::Dataset(format!(
                "index {} out of range for split of length {}",
                index,
                self.len()
            )));
        }

        let image = self.images.get(index)?;
        let label = self.labels.get(index)?.to_scalar::<u32>()?;
        if label as usize >= NUM_CLASSES {
            return Err(crate::TrainError::Dataset(format!(
                "label {} at index {} outside the {}-class label space",
                label, index, NUM_CLASSES
            )));
        }

        Ok((image, label))
    }

    /// Full image and label tensors for the split
    pub fn tensors(&self) -> (&Tensor, &Tensor) {
        (&self.images, &self.labels)
    }
}

/// Batch loader over a [`TensorArchiveDataset`]
///
/// Yields fixed-size `(images, labels)` batches with the final partial batch
/// included. When shuffling is on, the sample order is re-permuted on every
/// reset, i.e. once per epoch.
pub struct ShuffleDataLoader {
    dataset: TensorArchiveDataset,
    batch_size: usize,
    current_idx: usize,
    indices: Vec<usize>,
    shuffle: bool,
}

impl ShuffleDataLoader {
    /// Create new data loader
    pub fn new(dataset: TensorArchiveDataset, batch_size: usize, shuffle: bool) -> Self {
        let num_samples = dataset.len();
        let mut indices: Vec<usize> = (0..num_samples).collect();

        if shuffle {
            use rand::seq::SliceRandom;
            let mut rng = rand::thread_rng();
            indices.shuffle(&mut rng);
        }

        Self {
            dataset,
            batch_size,
            current_idx: 0,
            indices,
            shuffle,
        }
    }

    /// Get next batch of (images, labels)
    pub fn next_batch(&mut self, device: &Device) -> Result<Option<(Tensor, Tensor)>> {
        if self.current_idx >= self.indices.len() {
            return Ok(None);
        }

        let end_idx = (self.current_idx + self.batch_size).min(self.indices.len());
        let batch_indices: Vec<u32> = self.indices[self.current_idx..end_idx]
            .iter()
            .map(|&idx| idx as u32)
            .collect();
        self.current_idx = end_idx;

        let batch_len = batch_indices.len();
        let idx_tensor = Tensor::from_vec(batch_indices, (batch_len,), device)?;
        let (images, labels) = self.dataset.tensors();
        let batch_images = images.index_select(&idx_tensor, 0)?;
        let batch_labels = labels.index_select(&idx_tensor, 0)?;

        Ok(Some((batch_images, batch_labels)))
    }

    /// Reset loader for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;

        if self.shuffle {
            use rand::seq::SliceRandom;
            let mut rng = rand::thread_rng();
            self.indices.shuffle(&mut rng);
        }
    }

    /// Get number of batches
    pub fn num_batches(&self) -> usize {
        (self.dataset.len() + self.batch_size - 1) / self.batch_size
    }

    /// Get dataset reference
    pub fn dataset(&self) -> &TensorArchiveDataset {
        &self.dataset
    }
}

impl super::BatchDataLoader for ShuffleDataLoader {
    fn next_batch(&mut self, device: &Device) -> Result<Option<(Tensor, Tensor)>> {
        ShuffleDataLoader::next_batch(self, device)
    }

    fn reset(&mut self) {
        ShuffleDataLoader::reset(self)
    }

    fn num_batches(&self) -> usize {
        ShuffleDataLoader::num_batches(self)
    }
}
