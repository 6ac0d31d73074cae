use std::{cmp::Reverse, collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::utils::files::write_atomic;

/// Embedding-table row reserved for padding
pub const PAD_INDEX: usize = 0;

/// Embedding-table row reserved for unknown tokens
pub const UNK_INDEX: usize = 1;

/// Offset between a vocabulary index and its embedding-table row
pub const INDEX_OFFSET: usize = 2;

/// Vocabulary Load Error
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// The snapshot file could not be read or written
    #[error("unable to access vocabulary snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot bytes could not be decoded
    #[error("malformed vocabulary snapshot: {0}")]
    Malformed(#[from] bincode::Error),

    /// The attached vectors don't match the token count and dimension
    #[error("expected {expected} vector components, found {found}")]
    VectorShape {
        /// tokens * embedding_dim
        expected: usize,
        /// Number of components supplied
        found: usize,
    },
}

/// Split a line into lowercased whitespace-delimited tokens. Shared by the
/// term-frequency and sequence encoders so the two can never disagree.
pub fn tokenize(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split_whitespace().map(str::to_lowercase)
}

/// The on-disk form of the vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    tokens: Vec<String>,
    embedding_dim: usize,
    vectors: Vec<f32>,
}

/// The fixed set of recognized tokens, mapping each token to an index and,
/// optionally, to a dense embedding vector. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    embedding_dim: usize,
    vectors: Vec<f32>,
}

impl Vocabulary {
    /// Construct from an explicit token order, without vectors
    pub fn new(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Self {
            tokens,
            index,
            embedding_dim: 0,
            vectors: Vec::new(),
        }
    }

    /// Build a vocabulary from a corpus, keeping tokens that occur at least
    /// `min_count` times, ordered by descending frequency then token
    pub fn build<S: AsRef<str>>(lines: &[S], min_count: usize) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for line in lines {
            for token in tokenize(line.as_ref()) {
                *counts.entry(token).or_default() += 1;
            }
        }

        let mut tokens: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(_, count)| *count >= min_count)
            .collect();

        tokens.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));

        Self::new(tokens.into_iter().map(|(token, _)| token).collect())
    }

    /// Attach one `dim`-component vector per token, in token order
    pub fn with_vectors(mut self, dim: usize, vectors: Vec<f32>) -> Result<Self, LoadError> {
        let expected = self.tokens.len() * dim;

        if vectors.len() != expected {
            return Err(LoadError::VectorShape {
                expected,
                found: vectors.len(),
            });
        }

        self.embedding_dim = dim;
        self.vectors = vectors;

        Ok(self)
    }

    /// Load a persisted snapshot
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = fs::read(path)?;
        let snapshot: Snapshot = bincode::deserialize(&bytes)?;

        let vocab = Self::new(snapshot.tokens);

        if snapshot.embedding_dim == 0 {
            Ok(vocab)
        } else {
            vocab.with_vectors(snapshot.embedding_dim, snapshot.vectors)
        }
    }

    /// Persist a snapshot, atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let snapshot = Snapshot {
            tokens: self.tokens.clone(),
            embedding_dim: self.embedding_dim,
            vectors: self.vectors.clone(),
        };

        let bytes = bincode::serialize(&snapshot)?;
        write_atomic(path, &bytes)?;

        Ok(())
    }

    /// Term-frequency encoding of a line: one count per vocabulary token.
    /// Out-of-vocabulary tokens are ignored, so the vector length always
    /// equals the vocabulary size.
    pub fn get_tf_encoding(&self, line: &str) -> Vec<f32> {
        let mut encoding = vec![0.0; self.tokens.len()];

        for token in tokenize(line) {
            if let Some(&i) = self.index.get(&token) {
                encoding[i] += 1.0;
            }
        }

        encoding
    }

    /// Encode a line as embedding-table row indices. Known tokens map to
    /// `index + INDEX_OFFSET`, unknown tokens to `UNK_INDEX`.
    pub fn encode_sequence(&self, line: &str) -> Vec<usize> {
        tokenize(line)
            .map(|token| {
                self.index
                    .get(&token)
                    .map(|i| i + INDEX_OFFSET)
                    .unwrap_or(UNK_INDEX)
            })
            .collect()
    }

    /// The index assigned to a token
    pub fn id(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// The token at an index
    pub fn token(&self, id: usize) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    /// The attached vector for a token, if vectors were attached
    pub fn vector(&self, token: &str) -> Option<&[f32]> {
        let i = self.id(token)?;

        if self.embedding_dim == 0 {
            return None;
        }

        Some(&self.vectors[i * self.embedding_dim..(i + 1) * self.embedding_dim])
    }

    /// All tokens, in index order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The dimension of attached vectors (0 when none are attached)
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the vocabulary has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Vocabulary {
        Vocabulary::new(vec!["good".into(), "bad".into(), "product".into()])
    }

    #[test]
    fn tf_encoding_counts_tokens_in_vocab_order() {
        let vocab = sample();

        assert_eq!(vocab.get_tf_encoding("good product"), vec![1.0, 0.0, 1.0]);
        assert_eq!(vocab.get_tf_encoding("bad product"), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn tf_encoding_ignores_out_of_vocabulary_tokens() {
        let vocab = sample();

        let encoding = vocab.get_tf_encoding("good good unseen thing");

        assert_eq!(encoding.len(), vocab.len());
        assert_eq!(encoding, vec![2.0, 0.0, 0.0]);
        assert!(encoding.iter().all(|&count| count >= 0.0));
    }

    #[test]
    fn sequence_encoding_offsets_known_tokens_and_buckets_unknowns() {
        let vocab = sample();

        assert_eq!(
            vocab.encode_sequence("Bad unseen GOOD"),
            vec![1 + INDEX_OFFSET, UNK_INDEX, INDEX_OFFSET]
        );
    }

    #[test]
    fn build_orders_by_frequency_then_token() {
        let lines = ["good good product", "bad product", "rare"];

        let vocab = Vocabulary::build(&lines, 1);

        assert_eq!(vocab.tokens(), &["good", "product", "bad", "rare"]);

        let trimmed = Vocabulary::build(&lines, 2);
        assert_eq!(trimmed.tokens(), &["good", "product"]);
    }

    #[test]
    fn snapshot_round_trips_tokens_and_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.bin");

        let vectors = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let vocab = sample().with_vectors(2, vectors).unwrap();
        vocab.save(&path).unwrap();

        let loaded = Vocabulary::load(&path).unwrap();

        assert_eq!(loaded.tokens(), vocab.tokens());
        assert_eq!(loaded.id("bad"), Some(1));
        assert_eq!(loaded.vector("bad"), Some(&[0.3, 0.4][..]));
        assert_eq!(loaded.embedding_dim(), 2);
    }

    #[test]
    fn load_fails_on_missing_and_corrupt_snapshots() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Vocabulary::load(dir.path().join("nope.bin"));
        assert!(matches!(missing, Err(LoadError::Io(_))));

        let path = dir.path().join("corrupt.bin");
        std::fs::write(&path, b"not a snapshot").unwrap();

        let corrupt = Vocabulary::load(&path);
        assert!(matches!(corrupt, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn vector_shape_is_validated() {
        let result = sample().with_vectors(2, vec![0.0; 5]);

        assert!(matches!(
            result,
            Err(LoadError::VectorShape {
                expected: 6,
                found: 5
            })
        ));
    }
}
