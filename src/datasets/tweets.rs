use burn::data::dataset;
use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::utils::files::read_file;

use super::DatasetError;

/// The name of the tweet sentiment dataset
pub static DATASET: &str = "tweets";

/// A labeled tweet
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// The tweet text
    pub text: String,

    /// The sentiment class name
    pub label: String,
}

/// An ordered collection of labeled tweets
#[derive(Debug, Clone)]
pub struct Dataset {
    items: Vec<Item>,

    /// The distinct class labels, sorted
    pub labels: Vec<String>,
}

/// Implement the Dataset trait for the tweets dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.items.get(index).cloned()
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.items.len()
    }
}

impl Dataset {
    /// Load labeled data from a CSV file with `text,label` headers
    pub async fn load(path: &str) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().from_path(path)?;

        let items = reader
            .deserialize()
            .collect::<Result<Vec<Item>, csv::Error>>()?;

        if items.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut labels: Vec<String> = items.iter().map(|item| item.label.clone()).collect();
        labels.sort();
        labels.dedup();

        Ok(Self { items, labels })
    }

    /// Load unlabeled test data, one tweet per line. Line order is
    /// preserved so prediction ids line up with 1-based line numbers.
    pub async fn load_test(path: &str) -> Result<Vec<String>, DatasetError> {
        let lines = read_file(path).await?;

        Ok(lines.into_iter().map(|line| line.trim().to_string()).collect())
    }

    /// Deterministically partition into train and validation subsets. The
    /// same seed and ratio always produce the same disjoint, exhaustive
    /// partition.
    pub fn split(self, train_ratio: f64, seed: u64) -> (Self, Self) {
        let mut indices: Vec<usize> = (0..self.items.len()).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        let n_train = (self.items.len() as f64 * train_ratio).round() as usize;

        let mut train = Vec::with_capacity(n_train);
        let mut valid = Vec::with_capacity(self.items.len() - n_train);

        for (position, index) in indices.into_iter().enumerate() {
            if position < n_train {
                train.push(self.items[index].clone());
            } else {
                valid.push(self.items[index].clone());
            }
        }

        (
            Self {
                items: train,
                labels: self.labels.clone(),
            },
            Self {
                items: valid,
                labels: self.labels,
            },
        )
    }

    /// The labeled items, in order
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn sample(n: usize) -> Dataset {
        let items = (0..n)
            .map(|i| {
                Item::new(
                    format!("tweet number {i}"),
                    if i % 2 == 0 { "1" } else { "-1" }.to_string(),
                )
            })
            .collect();

        Dataset {
            items,
            labels: vec!["-1".to_string(), "1".to_string()],
        }
    }

    #[tokio::test]
    async fn loads_labeled_csv_and_collects_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(&path, "text,label\ngood product,1\nbad product,-1\n").unwrap();

        let dataset = Dataset::load(path.to_str().unwrap()).await.unwrap();

        assert_eq!(dataset.items().len(), 2);
        assert_eq!(dataset.labels, vec!["-1", "1"]);
        assert_eq!(dataset.items()[0].text, "good product");
    }

    #[tokio::test]
    async fn empty_labeled_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(&path, "text,label\n").unwrap();

        let result = Dataset::load(path.to_str().unwrap()).await;

        assert!(matches!(result, Err(DatasetError::Empty)));
    }

    #[test]
    fn split_is_deterministic_for_a_fixed_seed() {
        let (train_a, valid_a) = sample(100).split(0.9, 42);
        let (train_b, valid_b) = sample(100).split(0.9, 42);

        let texts = |d: &Dataset| d.items().iter().map(|i| i.text.clone()).collect::<Vec<_>>();

        assert_eq!(texts(&train_a), texts(&train_b));
        assert_eq!(texts(&valid_a), texts(&valid_b));
    }

    #[test]
    fn split_is_disjoint_and_exhaustive() {
        let (train, valid) = sample(100).split(0.9, 7);

        assert_eq!(train.items().len(), 90);
        assert_eq!(valid.items().len(), 10);

        let train_texts: HashSet<_> = train.items().iter().map(|i| i.text.clone()).collect();
        let valid_texts: HashSet<_> = valid.items().iter().map(|i| i.text.clone()).collect();

        assert!(train_texts.is_disjoint(&valid_texts));
        assert_eq!(train_texts.len() + valid_texts.len(), 100);
    }
}
