use std::{fs, path::Path, sync::Arc};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    utils::files::{read_file, write_atomic},
    vocab::Vocabulary,
};

/// Term-Frequency Encoding Error
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// The source could not be read or the destination written
    #[error("unable to access encoding file: {0}")]
    Io(#[from] std::io::Error),

    /// Lines cannot be encoded against an empty vocabulary
    #[error("cannot encode with an empty vocabulary")]
    EmptyVocabulary,

    /// A persisted matrix could not be decoded
    #[error("malformed term-frequency matrix: {0}")]
    Malformed(#[from] bincode::Error),
}

/// A dense 2-D matrix of term frequencies: one row per input line, one
/// column per vocabulary token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl TfMatrix {
    /// Load a persisted matrix
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EncodeError> {
        let bytes = fs::read(path)?;

        Ok(bincode::deserialize(&bytes)?)
    }

    /// Number of encoded lines
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vocabulary size the matrix was encoded against
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One encoded line
    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }
}

/// Encodes each line of a text file as a term-frequency vector and persists
/// the stacked matrix
pub struct TfEncoder {
    vocab: Arc<Vocabulary>,
}

impl TfEncoder {
    /// Creates a new encoder over a loaded vocabulary
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// Encode each line in `source` and dump the matrix to `dest`,
    /// overwriting it if it exists. The write is atomic: a failure part-way
    /// through leaves no output behind.
    pub async fn encode(&self, source: &str, dest: &str) -> Result<TfMatrix, EncodeError> {
        if self.vocab.is_empty() {
            return Err(EncodeError::EmptyVocabulary);
        }

        let lines = read_file(source).await?;

        let cols = self.vocab.len();
        let mut data = Vec::with_capacity(lines.len() * cols);

        for line in &lines {
            data.extend(self.vocab.get_tf_encoding(line.trim()));
        }

        let matrix = TfMatrix {
            rows: lines.len(),
            cols,
            data,
        };

        debug!("encoded {} lines x {} tokens", matrix.rows, matrix.cols);

        let bytes = bincode::serialize(&matrix)?;
        write_atomic(dest, &bytes)?;

        Ok(matrix)
    }
}
