use std::{path::Path, sync::Arc};

use burn::{
    config::Config as _,
    data::dataloader::batcher::Batcher as BatcherTrait,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::{backend::Backend, Tensor},
};
use log::info;

use crate::{
    models::{Model, ModelConfig},
    utils::files::write_atomic,
    vocab::Vocabulary,
};

use super::Batcher;

/// Define inference function
pub fn infer<B: Backend>(
    device: B::Device,     // Device on which to perform computation
    artifact_dir: &str,    // Directory containing model and config files
    vocab: Arc<Vocabulary>, // Vocabulary for encoding
    samples: Vec<String>,  // Text samples for inference
) -> anyhow::Result<(Tensor<B, 2>, ModelConfig)> {
    // Load experiment configuration
    let config = ModelConfig::load(format!("{artifact_dir}/config.json").as_str())
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    config.validate()?;

    // Initialize batcher for batching samples
    let batcher = Batcher::<B>::new(vocab, &config.labels, config.seq_length, device.clone());

    // Load trained model weights
    info!("Loading weights...");

    let record = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), &device)
        .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

    // Create model using loaded weights
    info!("Creating model...");

    let model: Model<B> = config.init(None, &device).load_record(record);

    // Run inference on the given text samples
    info!("Running inference...");

    let item = batcher.batch(samples);

    Ok((model.infer(item), config))
}

/// Map per-example class probabilities to label names via argmax
pub fn predicted_labels<B: Backend>(
    probabilities: Tensor<B, 2>,
    config: &ModelConfig,
) -> Vec<String> {
    probabilities
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .value
        .into_iter()
        .map(|index| config.labels[index as usize].clone())
        .collect()
}

/// Write predictions as plain text: an `Id,Prediction` header, then one
/// `<1-based index>,<label>` line per example
pub fn write_predictions(path: impl AsRef<Path>, labels: &[String]) -> std::io::Result<()> {
    let mut out = String::from("Id,Prediction\n");

    for (index, label) in labels.iter().enumerate() {
        out.push_str(&format!("{},{}\n", index + 1, label));
    }

    write_atomic(path, out.as_bytes())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn prediction_files_have_a_header_and_one_based_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.txt");

        let labels = vec!["1".to_string(), "-1".to_string(), "1".to_string()];
        write_predictions(&path, &labels).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Id,Prediction");
        assert_eq!(lines[1], "1,1");
        assert_eq!(lines[2], "2,-1");
        assert_eq!(lines[3], "3,1");
    }

    #[test]
    fn argmax_maps_to_label_names() {
        use burn::backend::NdArray;
        use burn::tensor::Data;

        let device = Default::default();
        let probabilities = Tensor::<NdArray, 2>::from_data(
            Data::from([[0.9, 0.1], [0.2, 0.8], [0.7, 0.3]]),
            &device,
        );

        let config = ModelConfig::new(
            crate::models::Architecture::Vanilla,
            3,
            vec!["-1".to_string(), "1".to_string()],
        );

        assert_eq!(predicted_labels(probabilities, &config), vec!["-1", "1", "-1"]);
    }
}
