use burn::{
    module::Module,
    nn::{
        conv::{Conv1d, Conv1dConfig, Conv2d, Conv2dConfig},
        pool::{MaxPool1d, MaxPool1dConfig, MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig,
    },
    tensor::{activation::relu, backend::Backend, Tensor},
};

use super::ModelConfig;

/// Kernel sizes of the parallel convolution branches
const FILTER_SIZES: [usize; 3] = [3, 4, 5];

/// Channels of the stacked 2-D convolutions
const CONV2_CHANNELS: usize = 32;

/// Parallel 1-D convolution branches, each global-max-pooled over time and
/// concatenated
#[derive(Module, Debug)]
pub struct PooledConv<B: Backend> {
    filters: Vec<Conv1d<B>>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> PooledConv<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        let filters = FILTER_SIZES
            .iter()
            .map(|&kernel_size| {
                Conv1dConfig::new(config.embedding_dim, config.num_filters, kernel_size)
                    .init(device)
            })
            .collect();

        Self {
            filters,
            dropout: DropoutConfig::new(config.dropout * 2.0).init(),
            output: LinearConfig::new(FILTER_SIZES.len() * config.num_filters, config.n_classes)
                .init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        // [batch_size, channels, seq_length]
        let x = embedded.swap_dims(1, 2);

        let pooled: Vec<Tensor<B, 2>> = self
            .filters
            .iter()
            .map(|conv| global_max_pool(relu(conv.forward(x.clone()))))
            .collect();

        self.output
            .forward(self.dropout.forward(Tensor::cat(pooled, 1)))
    }
}

/// Stacked 2-D convolutions treating the embedded sequence as a 1-channel
/// image
#[derive(Module, Debug)]
pub struct StackedConv<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    pool: MaxPool2d,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> StackedConv<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        // two valid-padding 3x3 convolutions then a 2x2 pool
        let pooled_height = (config.seq_length - 4) / 2;
        let pooled_width = (config.embedding_dim - 4) / 2;
        let flattened = CONV2_CHANNELS * pooled_height * pooled_width;

        Self {
            conv1: Conv2dConfig::new([1, CONV2_CHANNELS], [3, 3]).init(device),
            conv2: Conv2dConfig::new([CONV2_CHANNELS, CONV2_CHANNELS], [3, 3]).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            dropout: DropoutConfig::new(config.dropout * 2.0).init(),
            output: LinearConfig::new(flattened, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_length, embedding_dim] = embedded.dims();

        let x = embedded.reshape([batch_size, 1, seq_length, embedding_dim]);
        let x = relu(self.conv1.forward(x));
        let x = relu(self.conv2.forward(x));
        let x = self.pool.forward(x);

        let [b, channels, height, width] = x.dims();
        let x = x.reshape([b, channels * height * width]);

        self.output.forward(self.dropout.forward(x))
    }
}

/// Two thinning 1-D convolutions with a pool in between
#[derive(Module, Debug)]
pub struct SwissCheese<B: Backend> {
    conv1: Conv1d<B>,
    pool: MaxPool1d,
    conv2: Conv1d<B>,
    output: Linear<B>,
}

impl<B: Backend> SwissCheese<B> {
    /// Assemble the head from the shared hyperparameters
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        Self {
            conv1: Conv1dConfig::new(config.embedding_dim, config.num_filters, 3).init(device),
            pool: MaxPool1dConfig::new(3).with_stride(3).init(),
            conv2: Conv1dConfig::new(config.num_filters, config.num_filters / 2, 3).init(device),
            output: LinearConfig::new(config.num_filters / 2, config.n_classes).init(device),
        }
    }

    /// Compute class logits from embedded tokens
    pub fn forward(&self, embedded: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = embedded.swap_dims(1, 2);
        let x = relu(self.conv1.forward(x));
        let x = self.pool.forward(x);
        let x = relu(self.conv2.forward(x));

        self.output.forward(global_max_pool(x))
    }
}

/// Max-pool a `[batch_size, channels, length]` feature map over its full
/// length
pub fn global_max_pool<B: Backend>(features: Tensor<B, 3>) -> Tensor<B, 2> {
    let [batch_size, channels, _] = features.dims();

    features.max_dim(2).reshape([batch_size, channels])
}
