/// The vocabulary and its persisted snapshot
pub mod vocabulary;

/// Pretrained embedding tables
pub mod embeddings;

pub use embeddings::{EmbeddingError, EmbeddingKind, EmbeddingTable};
pub use vocabulary::{tokenize, LoadError, Vocabulary, INDEX_OFFSET, PAD_INDEX, UNK_INDEX};
