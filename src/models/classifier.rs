/// Feed-forward image classifier
///
/// A small MLP over flattened image pixels. The forward pass returns
/// log-probabilities so the output can be fed straight into a
/// negative-log-likelihood loss.
use candle_core::{Result, Tensor, D};
use candle_nn::{linear, ops, Linear, Module, VarBuilder};

/// Classifier architecture configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassifierConfig {
    /// Flattened input dimension (28x28 grayscale by default)
    pub input_dim: usize,

    /// Hidden layer widths, applied in order with ReLU between them
    pub hidden_dims: Vec<usize>,

    /// Number of output classes
    pub num_classes: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_dim: 28 * 28,
            hidden_dims: vec![256, 128, 64],
            num_classes: 10,
        }
    }
}

impl ClassifierConfig {
    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.input_dim == 0 || self.num_classes == 0 {
            return Err(crate::TrainError::Config(
                "input_dim and num_classes must be > 0".to_string(),
            ));
        }

        if self.hidden_dims.iter().any(|&d| d == 0) {
            return Err(crate::TrainError::Config(
                "hidden layer widths must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// MLP classifier emitting log-probabilities
pub struct Classifier {
    hidden: Vec<Linear>,
    output: Linear,
}

impl Classifier {
    /// Build the linear stack from a variable builder
    pub fn new(config: &ClassifierConfig, vb: VarBuilder) -> Result<Self> {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for (i, &width) in config.hidden_dims.iter().enumerate() {
            hidden.push(linear(in_dim, width, vb.pp(format!("fc{}", i + 1)))?);
            in_dim = width;
        }
        let output = linear(in_dim, config.num_classes, vb.pp("out"))?;

        Ok(Self { hidden, output })
    }
}

impl Module for Classifier {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        // Flatten [batch, C, H, W] images into [batch, input_dim]
        let mut xs = xs.flatten_from(1)?;
        for layer in &self.hidden {
            xs = layer.forward(&xs)?.relu()?;
        }
        let logits = self.output.forward(&xs)?;
        ops::log_softmax(&logits, D::Minus1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn small_config() -> ClassifierConfig {
        ClassifierConfig {
            input_dim: 16,
            hidden_dims: vec![8],
            num_classes: 10,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(ClassifierConfig::default().validate().is_ok());

        let bad = ClassifierConfig {
            hidden_dims: vec![8, 0],
            ..ClassifierConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_forward_shape() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = Classifier::new(&small_config(), vb)?;

        let images = Tensor::randn(0f32, 1.0, (5, 1, 4, 4), &device)?;
        let log_ps = model.forward(&images)?;
        assert_eq!(log_ps.dims(), &[5, 10]);

        Ok(())
    }

    #[test]
    fn test_output_is_log_probabilities() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = Classifier::new(&small_config(), vb)?;

        let images = Tensor::randn(0f32, 1.0, (3, 16), &device)?;
        let log_ps = model.forward(&images)?;

        // Probabilities recovered from the log output sum to one per row.
        let row_sums = log_ps.exp()?.sum(D::Minus1)?.to_vec1::<f32>()?;
        for sum in row_sums {
            assert!((sum - 1.0).abs() < 1e-4, "row sum {} != 1", sum);
        }

        Ok(())
    }
}
