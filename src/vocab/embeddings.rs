use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::utils::files::read_file;

use super::vocabulary::{Vocabulary, INDEX_OFFSET};
#[cfg(test)]
use super::vocabulary::UNK_INDEX;

/// Range of the seeded uniform initialization for tokens without a
/// pretrained vector
const INIT_RANGE: f32 = 0.25;

/// Embedding Error
#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    /// The embedding source file could not be read
    #[error("unable to read embedding source: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be parsed as a token followed by float components
    #[error("malformed embedding entry on line {line}")]
    Malformed {
        /// 1-based line number
        line: usize,
    },

    /// No embedding kind matches the given name
    #[error("unknown embedding type {0}")]
    UnknownKind(String),

    /// A vector had the wrong number of components
    #[error("embedding on line {line} has {found} components, expected {expected}")]
    DimensionMismatch {
        /// 1-based line number
        line: usize,
        /// The configured dimension
        expected: usize,
        /// Number of components found
        found: usize,
    },
}

/// The supported word-embedding sources
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EmbeddingKind {
    /// GloVe text format: one token and its components per line
    Glove,

    /// word2vec text format: a count/dimension header line, then entries
    Word2Vec,

    /// No pretrained source; the embedding layer trains from scratch
    Learned,
}

impl TryFrom<&str> for EmbeddingKind {
    type Error = EmbeddingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "glove" => Ok(EmbeddingKind::Glove),
            "word2vec" => Ok(EmbeddingKind::Word2Vec),
            "learned" => Ok(EmbeddingKind::Learned),
            _ => Err(EmbeddingError::UnknownKind(value.to_string())),
        }
    }
}

/// A pretrained token → vector table parsed from a text embedding file
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    /// Parse a pretrained embedding file. Every entry must have exactly
    /// `dim` components.
    pub async fn load(path: &str, kind: EmbeddingKind, dim: usize) -> Result<Self, EmbeddingError> {
        let lines = read_file(path).await?;

        // word2vec text files open with a "<count> <dim>" header
        let skip = usize::from(kind == EmbeddingKind::Word2Vec);

        let mut vectors = HashMap::new();

        for (number, line) in lines.iter().enumerate().skip(skip) {
            if line.trim().is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();

            let token = parts
                .next()
                .ok_or(EmbeddingError::Malformed { line: number + 1 })?;

            let components = parts
                .map(str::parse)
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|_| EmbeddingError::Malformed { line: number + 1 })?;

            if components.len() != dim {
                return Err(EmbeddingError::DimensionMismatch {
                    line: number + 1,
                    expected: dim,
                    found: components.len(),
                });
            }

            vectors.insert(token.to_string(), components);
        }

        Ok(Self { dim, vectors })
    }

    /// Construct directly from parsed vectors
    pub fn new(dim: usize, vectors: HashMap<String, Vec<f32>>) -> Self {
        Self { dim, vectors }
    }

    /// The vector dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The pretrained vector for a token, if present
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// One vector per vocabulary token, in index order. Tokens missing from
    /// the table get a seeded uniform(-0.25, 0.25) vector.
    pub fn vocab_vectors(&self, vocab: &Vocabulary, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = Vec::with_capacity(vocab.len() * self.dim);

        for token in vocab.tokens() {
            match self.vectors.get(token) {
                Some(vector) => out.extend_from_slice(vector),
                None => out.extend(random_row(&mut rng, self.dim)),
            }
        }

        out
    }

    /// The full embedding-initialization matrix: `vocab.len() + 2` rows of
    /// `dim` components. Row 0 (padding) is all zeros, row 1 (unknown) and
    /// any token missing from the table are seeded-random.
    pub fn init_matrix(&self, vocab: &Vocabulary, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = vocab.len() + INDEX_OFFSET;

        let mut matrix = Vec::with_capacity(rows * self.dim);

        // padding row
        matrix.extend(std::iter::repeat(0.0).take(self.dim));
        // unknown row
        matrix.extend(random_row(&mut rng, self.dim));

        for token in vocab.tokens() {
            match self.vectors.get(token) {
                Some(vector) => matrix.extend_from_slice(vector),
                None => matrix.extend(random_row(&mut rng, self.dim)),
            }
        }

        matrix
    }
}

fn random_row(rng: &mut StdRng, dim: usize) -> impl Iterator<Item = f32> + '_ {
    (0..dim).map(move |_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn parses_glove_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glove.txt");
        fs::write(&path, "good 0.1 0.2\nbad -0.3 0.4\n").unwrap();

        let table = EmbeddingTable::load(path.to_str().unwrap(), EmbeddingKind::Glove, 2)
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("bad"), Some(&[-0.3, 0.4][..]));
    }

    #[tokio::test]
    async fn skips_the_word2vec_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w2v.txt");
        fs::write(&path, "2 2\ngood 0.1 0.2\nbad -0.3 0.4\n").unwrap();

        let table = EmbeddingTable::load(path.to_str().unwrap(), EmbeddingKind::Word2Vec, 2)
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("good"), Some(&[0.1, 0.2][..]));
    }

    #[tokio::test]
    async fn rejects_dimension_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glove.txt");
        fs::write(&path, "good 0.1 0.2 0.3\n").unwrap();

        let result = EmbeddingTable::load(path.to_str().unwrap(), EmbeddingKind::Glove, 2).await;

        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                line: 1,
                expected: 2,
                found: 3
            })
        ));
    }

    #[tokio::test]
    async fn rejects_unparsable_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glove.txt");
        fs::write(&path, "good 0.1 0.2\nbad 0.3 oops\n").unwrap();

        let result = EmbeddingTable::load(path.to_str().unwrap(), EmbeddingKind::Glove, 2).await;

        assert!(matches!(result, Err(EmbeddingError::Malformed { line: 2 })));
    }

    #[test]
    fn init_matrix_zeroes_padding_and_seeds_missing_rows() {
        let vocab = Vocabulary::new(vec!["good".into(), "unseen".into()]);

        let mut vectors = HashMap::new();
        vectors.insert("good".to_string(), vec![0.5, -0.5]);
        let table = EmbeddingTable::new(2, vectors);

        let matrix = table.init_matrix(&vocab, 7);

        assert_eq!(matrix.len(), (vocab.len() + INDEX_OFFSET) * 2);
        // padding row is zero
        assert_eq!(&matrix[0..2], &[0.0, 0.0]);
        // pretrained row is copied verbatim
        let good_row = (vocab.id("good").unwrap() + INDEX_OFFSET) * 2;
        assert_eq!(&matrix[good_row..good_row + 2], &[0.5, -0.5]);
        // unknown row is within the init range and reproducible
        let unk = &matrix[UNK_INDEX * 2..UNK_INDEX * 2 + 2];
        assert!(unk.iter().all(|c| c.abs() < INIT_RANGE));
        assert_eq!(matrix, table.init_matrix(&vocab, 7));
    }
}
