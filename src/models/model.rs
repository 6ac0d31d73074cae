use burn::{
    module::{Module, Param},
    nn::{loss::CrossEntropyLossConfig, Embedding, EmbeddingConfig},
    tensor::{
        activation::softmax,
        backend::{AutodiffBackend, Backend},
        Int, Tensor,
    },
    train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep},
};

use crate::{pipelines::text_classification::batcher, vocab::INDEX_OFFSET};

use super::{
    conv::{PooledConv, StackedConv, SwissCheese},
    ensemble::Ensemble,
    recurrent::{Bidirectional, GatedRecurrent, MultiLayer, Vanilla},
    Architecture, ModelConfig,
};

/// A sentiment classifier: a shared embedding layer plus exactly one
/// architecture head, selected by the configured variant
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    embedding: Embedding<B>,
    vanilla: Option<Vanilla<B>>,
    gru: Option<GatedRecurrent<B>>,
    bidi: Option<Bidirectional<B>>,
    multi_layer: Option<MultiLayer<B>>,
    ensemble: Option<Ensemble<B>>,
    conv: Option<PooledConv<B>>,
    conv2: Option<StackedConv<B>>,
    swisscheese: Option<SwissCheese<B>>,
    architecture: Architecture,
    label_smoothing: Option<f32>,
}

impl ModelConfig {
    /// Assemble a new model for the configured architecture. The embedding
    /// layer is initialized from `embedding_weights` when given (a
    /// `[vocab_size + 2, embedding_dim]` matrix), otherwise trained from
    /// scratch.
    pub fn init<B: Backend>(
        &self,
        embedding_weights: Option<Tensor<B, 2>>,
        device: &B::Device,
    ) -> Model<B> {
        let mut embedding =
            EmbeddingConfig::new(self.vocab_size + INDEX_OFFSET, self.embedding_dim).init(device);

        if let Some(weights) = embedding_weights {
            embedding.weight = Param::from_tensor(weights);
        }

        let mut model = Model {
            embedding,
            vanilla: None,
            gru: None,
            bidi: None,
            multi_layer: None,
            ensemble: None,
            conv: None,
            conv2: None,
            swisscheese: None,
            architecture: self.architecture,
            label_smoothing: self.label_smoothing,
        };

        match self.architecture {
            Architecture::Vanilla => model.vanilla = Some(Vanilla::new(self, device)),
            Architecture::Gru => model.gru = Some(GatedRecurrent::new(self, device)),
            Architecture::Bidi => model.bidi = Some(Bidirectional::new(self, device)),
            Architecture::MultiLayer => model.multi_layer = Some(MultiLayer::new(self, device)),
            Architecture::Ensemble => model.ensemble = Some(Ensemble::new(self, device)),
            Architecture::Conv => model.conv = Some(PooledConv::new(self, device)),
            Architecture::Conv2 => model.conv2 = Some(StackedConv::new(self, device)),
            Architecture::SwissCheese => model.swisscheese = Some(SwissCheese::new(self, device)),
        }

        model
    }
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Compute class logits for a batch of token-id sequences
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let embedded = self.embedding.forward(tokens);

        let head = "head matches the configured architecture";

        match self.architecture {
            Architecture::Vanilla => self.vanilla.as_ref().expect(head).forward(embedded),
            Architecture::Gru => self.gru.as_ref().expect(head).forward(embedded),
            Architecture::Bidi => self.bidi.as_ref().expect(head).forward(embedded),
            Architecture::MultiLayer => self.multi_layer.as_ref().expect(head).forward(embedded),
            Architecture::Ensemble => self.ensemble.as_ref().expect(head).forward(embedded),
            Architecture::Conv => self.conv.as_ref().expect(head).forward(embedded),
            Architecture::Conv2 => self.conv2.as_ref().expect(head).forward(embedded),
            Architecture::SwissCheese => self.swisscheese.as_ref().expect(head).forward(embedded),
        }
    }

    /// Defines forward pass for training
    pub fn forward_classification(
        &self,
        input: batcher::Infer<B>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let logits = self.forward(input.tokens);

        let loss = CrossEntropyLossConfig::new()
            .with_smoothing(self.label_smoothing)
            .init(&logits.device())
            .forward(logits.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output: logits,
            targets,
        }
    }

    /// Defines forward pass for inference
    pub fn infer(&self, input: batcher::Infer<B>) -> Tensor<B, 2> {
        softmax(self.forward(input.tokens), 1)
    }
}

/// Define training step
impl<B: AutodiffBackend> TrainStep<batcher::Train<B>, ClassificationOutput<B>> for Model<B> {
    fn step(&self, item: batcher::Train<B>) -> TrainOutput<ClassificationOutput<B>> {
        // Run forward pass, calculate gradients and return them along with
        // the output
        let output = self.forward_classification(item.input, item.targets);
        let grads = output.loss.backward();

        TrainOutput::new(self, grads, output)
    }
}

/// Define validation step
impl<B: Backend> ValidStep<batcher::Train<B>, ClassificationOutput<B>> for Model<B> {
    fn step(&self, item: batcher::Train<B>) -> ClassificationOutput<B> {
        // Run forward pass and return the output
        self.forward_classification(item.input, item.targets)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    type B = NdArray;

    fn config(architecture: Architecture) -> ModelConfig {
        ModelConfig::new(
            architecture,
            10,
            vec!["-1".to_string(), "1".to_string()],
        )
        .with_embedding_dim(12)
        .with_seq_length(16)
        .with_hidden_size(4)
        .with_dense_size(4)
        .with_num_filters(4)
    }

    #[test]
    fn every_architecture_produces_class_probabilities() {
        let device = Default::default();

        for architecture in Architecture::ALL {
            let model = config(architecture).init::<B>(None, &device);

            let tokens = Tensor::<B, 2, Int>::zeros([2, 16], &device);
            let probabilities = model.infer(batcher::Infer::new(tokens));

            assert_eq!(
                probabilities.dims(),
                [2, 2],
                "unexpected output shape for {architecture}"
            );

            let sums = probabilities.sum_dim(1).into_data().convert::<f32>().value;
            for sum in sums {
                assert!(
                    (sum - 1.0).abs() < 1e-5,
                    "probabilities for {architecture} sum to {sum}"
                );
            }
        }
    }

    #[test]
    fn pretrained_weights_are_loaded_into_the_embedding() {
        use burn::tensor::{Data, Shape};

        let device = Default::default();
        let config = config(Architecture::Vanilla);

        let rows = config.vocab_size + INDEX_OFFSET;
        let weights = Tensor::<B, 2>::from_data(
            Data::new(
                (0..rows * config.embedding_dim).map(|i| i as f32).collect(),
                Shape::new([rows, config.embedding_dim]),
            ),
            &device,
        );

        let model = config.init::<B>(Some(weights.clone()), &device);

        assert_eq!(
            model.embedding.weight.val().into_data().value,
            weights.into_data().value
        );
    }
}
