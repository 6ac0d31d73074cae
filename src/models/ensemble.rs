use burn::{
    module::Module,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig,
    },
    tensor::{activation::relu, backend::Backend, Tensor},
};

use crate::utils::tensors::last_step;

use super::{conv::global_max_pool, ModelConfig};

/// A recurrent branch and a convolutional branch over the same embeddings,
/// concatenated and pushed through a dense layer
#[derive(Module, Debug)]
pub struct Ensemble<B: Backend> {
    lstm: Lstm<B>,
    conv: Conv1d<B>,
    dense: Linear<B>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> Ensemble<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        Self {
            lstm: LstmConfig::new(config.embedding_dim, config.hidden_size, true).init(device),
            conv: Conv1dConfig::new(config.embedding_dim, config.num_filters, 3).init(device),
            dense: LinearConfig::new(
                config.hidden_size + config.num_filters,
                config.dense_size * 2,
            )
            .init(device),
            dropout: DropoutConfig::new(config.dropout * 2.0).init(),
            output: LinearConfig::new(config.dense_size * 2, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, hidden) = self.lstm.forward(embedded.clone(), None);
        let recurrent = last_step(hidden);

        let convolved = global_max_pool(relu(self.conv.forward(embedded.swap_dims(1, 2))));

        let merged = Tensor::cat(vec![recurrent, convolved], 1);
        let dense = relu(self.dense.forward(merged));

        self.output.forward(self.dropout.forward(dense))
    }
}
