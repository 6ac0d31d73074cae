use std::{collections::BTreeMap, sync::Arc};

use burn::{
    data::dataloader,
    tensor::{backend::Backend, Data, ElementConversion, Int, Tensor},
};
use derive_new::new;
use log::warn;

use crate::{datasets::tweets, utils::tensors::pad_to, vocab::Vocabulary};

/// An inference batch for text classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Token ids as a 2D tensor: [batch_size, seq_length]
    pub tokens: Tensor<B, 2, Int>,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Struct for batching text classification items
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Vocabulary for converting text to token ids
    pub vocab: Arc<Vocabulary>,

    /// Fixed sequence length for token-id sequences
    pub seq_length: usize,

    /// A mapping from class ids to class name labels
    pub id2label: BTreeMap<usize, String>,

    /// A mapping from class name labels to class ids
    pub label2id: BTreeMap<String, usize>,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(
        vocab: Arc<Vocabulary>,
        labels: &[String],
        seq_length: usize,
        device: B::Device,
    ) -> Self {
        let id2label: BTreeMap<usize, String> = labels.iter().cloned().enumerate().collect();

        let label2id = id2label
            .iter()
            .map(|(id, label)| (label.clone(), *id))
            .collect();

        Self {
            vocab,
            seq_length,
            id2label,
            label2id,
            device,
        }
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<String, Infer<B>> for Batcher<B> {
    /// Collects a vector of text samples into an inference batch
    fn batch(&self, items: Vec<String>) -> Infer<B> {
        let sequences = items
            .iter()
            .map(|line| self.vocab.encode_sequence(line))
            .collect();

        Infer {
            tokens: pad_to(sequences, self.seq_length, &self.device),
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<tweets::Item, Train<B>> for Batcher<B> {
    /// Collects a vector of labeled items into a training batch
    fn batch(&self, items: Vec<tweets::Item>) -> Train<B> {
        let batch_size = items.len();

        let inputs = items.iter().map(|item| item.text.clone()).collect();
        let input: Infer<B> = self.batch(inputs);

        let mut class_id_list = Vec::with_capacity(batch_size);

        // Create a class-id tensor for each item
        for item in &items {
            let class_id = match self.label2id.get(&item.label) {
                Some(&id) => id,
                None => {
                    warn!("unrecognized label {:?}, using class 0", item.label);
                    0
                }
            };

            class_id_list.push(Tensor::from_data(
                Data::from([(class_id as i64).elem()]),
                &self.device,
            ));
        }

        let targets = Tensor::cat(class_id_list, 0);

        Train { input, targets }
    }
}

#[cfg(test)]
mod tests {
    use burn::{backend::NdArray, data::dataloader::batcher::Batcher as _};
    use pretty_assertions::assert_eq;

    use crate::vocab::{INDEX_OFFSET, UNK_INDEX};

    use super::*;

    type B = NdArray;

    fn batcher(seq_length: usize) -> Batcher<B> {
        let vocab = Arc::new(Vocabulary::new(vec![
            "good".into(),
            "bad".into(),
            "product".into(),
        ]));

        Batcher::new(
            vocab,
            &["-1".to_string(), "1".to_string()],
            seq_length,
            Default::default(),
        )
    }

    #[test]
    fn pads_and_truncates_to_the_sequence_length() {
        let batcher = batcher(4);

        let batch: Infer<B> = batcher.batch(vec![
            "good product".to_string(),
            "good bad good bad good".to_string(),
        ]);

        assert_eq!(batch.tokens.dims(), [2, 4]);

        let good = INDEX_OFFSET as i64;
        let bad = (1 + INDEX_OFFSET) as i64;
        let product = (2 + INDEX_OFFSET) as i64;

        let rows = batch.tokens.into_data().convert::<i64>().value;
        assert_eq!(rows[0..4], [good, product, 0, 0]);
        assert_eq!(rows[4..8], [good, bad, good, bad]);
    }

    #[test]
    fn unknown_tokens_map_to_the_unknown_index() {
        let batcher = batcher(3);

        let batch: Infer<B> = batcher.batch(vec!["good mystery".to_string()]);

        let rows = batch.tokens.into_data().convert::<i64>().value;
        assert_eq!(rows, vec![INDEX_OFFSET as i64, UNK_INDEX as i64, 0]);
    }

    #[test]
    fn training_batches_carry_class_ids() {
        let batcher = batcher(3);

        let batch: Train<B> = batcher.batch(vec![
            tweets::Item::new("good product".to_string(), "1".to_string()),
            tweets::Item::new("bad product".to_string(), "-1".to_string()),
        ]);

        let targets = batch.targets.into_data().convert::<i64>().value;
        assert_eq!(targets, vec![1, 0]);
    }

    #[test]
    fn unrecognized_labels_fall_back_to_class_zero() {
        let batcher = batcher(3);

        let batch: Train<B> = batcher.batch(vec![tweets::Item::new(
            "good product".to_string(),
            "neutral".to_string(),
        )]);

        let targets = batch.targets.into_data().convert::<i64>().value;
        assert_eq!(targets, vec![0]);
    }
}
