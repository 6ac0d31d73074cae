use super::{Architecture, ModelError};

/// The loss functions available for training
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Loss {
    /// Plain cross-entropy
    CrossEntropy,

    /// Cross-entropy with label smoothing of 0.1
    SmoothedCrossEntropy,
}

impl Loss {
    /// The label-smoothing factor this loss applies, if any
    pub fn label_smoothing(&self) -> Option<f32> {
        match self {
            Loss::CrossEntropy => None,
            Loss::SmoothedCrossEntropy => Some(0.1),
        }
    }
}

impl TryFrom<&str> for Loss {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            // the Keras name maps to the same loss, in either spelling
            "cross-entropy" | "categorical-crossentropy" | "categorical_crossentropy" => {
                Ok(Loss::CrossEntropy)
            }
            "smoothed-cross-entropy" => Ok(Loss::SmoothedCrossEntropy),
            _ => Err(ModelError::UnsupportedLoss(value.to_string())),
        }
    }
}

/// The model hyperparameters, persisted alongside the trained weights
#[derive(burn::config::Config)]
pub struct ModelConfig {
    /// The network topology to assemble
    pub architecture: Architecture,

    /// Number of tokens in the vocabulary (the embedding table adds two
    /// reserved rows for padding and unknown tokens)
    pub vocab_size: usize,

    /// Class labels, in class-id order
    pub labels: Vec<String>,

    /// Dimension of the token embeddings
    #[config(default = 200)]
    pub embedding_dim: usize,

    /// Fixed number of token positions per example
    #[config(default = 40)]
    pub seq_length: usize,

    /// Hidden size of the recurrent layers
    #[config(default = 1024)]
    pub hidden_size: usize,

    /// Width of the dense layers between head and output
    #[config(default = 512)]
    pub dense_size: usize,

    /// Filters per convolution branch
    #[config(default = 128)]
    pub num_filters: usize,

    /// Dropout rate
    #[config(default = 0.2)]
    pub dropout: f64,

    /// Number of output classes
    #[config(default = 2)]
    pub n_classes: usize,

    /// Label smoothing applied by the cross-entropy loss
    #[config(default = "None")]
    pub label_smoothing: Option<f32>,
}

impl ModelConfig {
    /// Check that the label list can name every output class. A training
    /// CSV with a single distinct label would otherwise produce a model
    /// whose predictions cannot all be mapped back to a label.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.labels.len() < self.n_classes {
            return Err(ModelError::LabelMismatch {
                labels: self.labels.len(),
                n_classes: self.n_classes,
            });
        }

        Ok(())
    }
}
