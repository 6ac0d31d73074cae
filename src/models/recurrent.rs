use burn::{
    module::Module,
    nn::{
        gru::{Gru, GruConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig,
    },
    tensor::{activation::relu, backend::Backend, Tensor},
};

use crate::utils::tensors::last_step;

use super::ModelConfig;

/// Single LSTM layer feeding the classifier output
#[derive(Module, Debug)]
pub struct Vanilla<B: Backend> {
    lstm: Lstm<B>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> Vanilla<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        Self {
            lstm: LstmConfig::new(config.embedding_dim, config.hidden_size, true).init(device),
            dropout: DropoutConfig::new(config.dropout).init(),
            output: LinearConfig::new(config.hidden_size, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, hidden) = self.lstm.forward(embedded, None);

        self.output.forward(self.dropout.forward(last_step(hidden)))
    }
}

/// Single GRU layer feeding the classifier output
#[derive(Module, Debug)]
pub struct GatedRecurrent<B: Backend> {
    gru: Gru<B>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> GatedRecurrent<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        Self {
            gru: GruConfig::new(config.embedding_dim, config.hidden_size, true).init(device),
            dropout: DropoutConfig::new(config.dropout).init(),
            output: LinearConfig::new(config.hidden_size, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let hidden = self.gru.forward(embedded, None);

        self.output.forward(self.dropout.forward(last_step(hidden)))
    }
}

/// Forward and time-reversed LSTMs, sum-merged, with a dense layer before
/// the output
#[derive(Module, Debug)]
pub struct Bidirectional<B: Backend> {
    fwd: Lstm<B>,
    bwd: Lstm<B>,
    dense: Linear<B>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> Bidirectional<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        Self {
            fwd: LstmConfig::new(config.embedding_dim, config.hidden_size, true).init(device),
            bwd: LstmConfig::new(config.embedding_dim, config.hidden_size, true).init(device),
            dense: LinearConfig::new(config.hidden_size, config.dense_size).init(device),
            dropout: DropoutConfig::new(config.dropout).init(),
            output: LinearConfig::new(config.dense_size, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, forward_hidden) = self.fwd.forward(embedded.clone(), None);
        let (_, backward_hidden) = self.bwd.forward(embedded.flip([1]), None);

        // sum merge of the two directions
        let merged = last_step(forward_hidden) + last_step(backward_hidden);

        let dense = relu(self.dense.forward(merged));

        self.output.forward(self.dropout.forward(dense))
    }
}

/// Two stacked LSTM layers with two dense layers before the output
#[derive(Module, Debug)]
pub struct MultiLayer<B: Backend> {
    lower: Lstm<B>,
    upper: Lstm<B>,
    dense1: Linear<B>,
    dense2: Linear<B>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> MultiLayer<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        Self {
            lower: LstmConfig::new(config.embedding_dim, config.hidden_size, true).init(device),
            upper: LstmConfig::new(config.hidden_size, config.hidden_size, true).init(device),
            dense1: LinearConfig::new(config.hidden_size, config.dense_size * 2).init(device),
            dense2: LinearConfig::new(config.dense_size * 2, config.dense_size).init(device),
            dropout: DropoutConfig::new(config.dropout * 2.0).init(),
            output: LinearConfig::new(config.dense_size, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, lower_hidden) = self.lower.forward(embedded, None);
        let (_, upper_hidden) = self.upper.forward(lower_hidden, None);

        let x = last_step(upper_hidden);
        let x = self.dropout.forward(relu(self.dense1.forward(x)));
        let x = self.dropout.forward(relu(self.dense2.forward(x)));

        self.output.forward(x)
    }
}
