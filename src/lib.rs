//! # Tweet Sentiment
#![forbid(unsafe_code)]

/// Vocabulary and embeddings
pub mod vocab;

/// Term-frequency encoding
pub mod encoding;

/// Datasets
pub mod datasets;

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Utilities
pub mod utils;

/// Error macros
#[macro_use]
extern crate anyhow;
