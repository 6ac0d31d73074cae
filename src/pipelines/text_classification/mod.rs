/// Batcher
pub mod batcher;

/// Training
pub mod training;

/// Inference
pub mod inference;

/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "text-classification";

pub use batcher::Batcher;
pub use inference::{infer, predicted_labels, write_predictions};
pub use training::train;
