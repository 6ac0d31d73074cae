/// Labeled tweet datasets
pub mod tweets;

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// A dataset file could not be read
    #[error("unable to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    /// A labeled-data record could not be parsed
    #[error("malformed dataset file: {0}")]
    Csv(#[from] csv::Error),

    /// The labeled-data file contained no records
    #[error("dataset has no labeled items")]
    Empty,
}
