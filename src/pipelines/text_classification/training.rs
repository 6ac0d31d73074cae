use std::sync::Arc;

use burn::{
    config::Config as _,
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::Module as _,
    optim::AdamWConfig,
    record::{CompactRecorder, Recorder},
    tensor::{backend::AutodiffBackend, Data, Shape, Tensor},
    train::{
        metric::{AccuracyMetric, LearningRateMetric, LossMetric},
        LearnerBuilder,
    },
    LearningRate,
};
use log::info;

use crate::{
    datasets::tweets,
    models::ModelConfig,
    utils::renderer,
    vocab::{EmbeddingTable, Vocabulary, INDEX_OFFSET},
};

use super::Batcher;

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Config {
    /// Batch size
    #[config(default = 64)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 3)]
    pub num_epochs: usize,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Initial learning rate
    #[config(default = 1e-3)]
    pub learning_rate: LearningRate,

    /// Fraction of the labeled set kept for training (the rest validates)
    #[config(default = 0.9)]
    pub train_ratio: f64,

    /// Seed for the split, shuffling, and weight initialization
    #[config(default = 42)]
    pub seed: u64,

    /// The location of the top-level data directory
    #[config(default = "\"data\".to_string()")]
    pub data_dir: String,
}

impl Config {
    /// The directory where checkpoints, weights, and the model config land
    pub fn artifact_dir(&self, model_config: &ModelConfig) -> String {
        format!("{}/models/{}", self.data_dir, model_config.architecture)
    }
}

/// Define train function
#[allow(clippy::too_many_arguments)]
pub fn train<B, D>(
    devices: Vec<B::Device>, // Devices on which to perform computation
    vocab: Arc<Vocabulary>,  // Vocabulary for encoding
    dataset_train: D,        // Training dataset
    dataset_valid: D,        // Validation dataset
    embeddings: Option<EmbeddingTable>, // Pretrained embedding source, if any
    model_config: ModelConfig, // Model hyperparameters
    config: Config,          // Experiment configuration
    use_tui: bool,           // Whether to render the TUI dashboard
) -> anyhow::Result<()>
where
    B: AutodiffBackend,
    D: Dataset<tweets::Item> + 'static,
{
    model_config.validate()?;

    let device = &devices[0];
    let artifact_dir = config.artifact_dir(&model_config);

    B::seed(config.seed);

    // Build the embedding-initialization matrix from the pretrained table,
    // when one was supplied
    let embedding_weights = embeddings.map(|table| {
        let matrix = table.init_matrix(&vocab, config.seed);

        Tensor::from_data(
            Data::new(
                matrix,
                Shape::new([vocab.len() + INDEX_OFFSET, model_config.embedding_dim]),
            )
            .convert(),
            device,
        )
    });

    let model = model_config.init(embedding_weights, device);

    // Initialize batchers for training and validation data
    let batcher_train = Batcher::<B>::new(
        vocab.clone(),
        &model_config.labels,
        model_config.seq_length,
        device.clone(),
    );
    let batcher_valid = Batcher::<B::InnerBackend>::new(
        vocab,
        &model_config.labels,
        model_config.seq_length,
        device.clone(),
    );

    let workers = std::thread::available_parallelism()?;

    // Initialize data loaders for training and validation data
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(workers.into())
        .build(dataset_train);

    let dataloader_valid = DataLoaderBuilder::new(batcher_valid)
        .batch_size(config.batch_size * 2)
        .shuffle(config.seed)
        .num_workers(workers.into())
        .build(dataset_valid);

    // Initialize optimizer
    let optimizer = AdamWConfig::new().with_epsilon(config.adam_epsilon).init();

    // Initialize learner
    let mut builder = LearnerBuilder::new(&artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .metric_train_numeric(LearningRateMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(devices.clone())
        .num_epochs(config.num_epochs)
        .summary();

    if !use_tui {
        builder = builder.renderer(renderer::Simple::new());
    }

    let learner = builder.build(model, optimizer, config.learning_rate);

    // Train the model
    let model_trained = learner.fit(dataloader_train, dataloader_valid);

    // Save the configuration and the trained model
    model_config
        .save(format!("{artifact_dir}/config.json"))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;

    CompactRecorder::new()
        .record(
            model_trained.into_record(),
            format!("{artifact_dir}/model").into(),
        )
        .map_err(|e| anyhow!("Unable to save trained model weights: {}", e))?;

    info!("training artifacts saved to {artifact_dir}");

    Ok(())
}
