use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Model configuration and loss selection
pub mod config;

/// Convolutional heads
pub mod conv;

/// The combined recurrent + convolutional head
pub mod ensemble;

/// The classifier module
pub mod model;

/// Recurrent heads
pub mod recurrent;

pub use config::{Loss, ModelConfig};
pub use model::Model;

/// The fixed menu of network topologies
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// Single LSTM layer
    Vanilla,

    /// Single GRU layer
    Gru,

    /// Bidirectional LSTM, sum-merged
    Bidi,

    /// Two stacked LSTM layers with dense layers on top
    MultiLayer,

    /// Recurrent and convolutional branches, concatenated
    Ensemble,

    /// Parallel pooled convolution branches
    Conv,

    /// Stacked 2-D convolutions over the embedding "image"
    Conv2,

    /// Two thinning 1-D convolutions
    SwissCheese,
}

// Architecture carries no tensors, so it participates in modules as a
// constant (the burn 0.13 equivalent of a 0.14 `Ignored` field).
use burn::constant;
constant!(Architecture);

impl Architecture {
    /// Every variant, in menu order
    pub const ALL: [Architecture; 8] = [
        Architecture::Vanilla,
        Architecture::Gru,
        Architecture::Bidi,
        Architecture::MultiLayer,
        Architecture::Ensemble,
        Architecture::Conv,
        Architecture::Conv2,
        Architecture::SwissCheese,
    ];

    /// Get the unique string token that identifies this architecture
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Vanilla => "vanilla",
            Architecture::Gru => "gru",
            Architecture::Bidi => "bidi",
            Architecture::MultiLayer => "multi_layer",
            Architecture::Ensemble => "ensemble",
            Architecture::Conv => "conv",
            Architecture::Conv2 => "conv2",
            Architecture::SwissCheese => "swisscheese",
        }
    }
}

impl TryFrom<&str> for Architecture {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "vanilla" => Ok(Architecture::Vanilla),
            "gru" => Ok(Architecture::Gru),
            "bidi" => Ok(Architecture::Bidi),
            "multi_layer" => Ok(Architecture::MultiLayer),
            // "ensamble" kept for compatibility with older run scripts
            "ensemble" | "ensamble" => Ok(Architecture::Ensemble),
            "conv" => Ok(Architecture::Conv),
            "conv2" => Ok(Architecture::Conv2),
            "swisscheese" => Ok(Architecture::SwissCheese),
            _ => Err(ModelError::UnsupportedArchitecture(value.to_string())),
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No architecture found for the given string
    #[error("unsupported architecture {0}")]
    UnsupportedArchitecture(String),

    /// No loss function found for the given string
    #[error("unsupported loss function {0}")]
    UnsupportedLoss(String),

    /// The label list cannot name every output class
    #[error("{labels} class labels cannot cover {n_classes} output classes")]
    LabelMismatch {
        /// Number of distinct labels supplied
        labels: usize,
        /// Configured number of output classes
        n_classes: usize,
    },
}
