/// Term-frequency encoding of text files
pub mod tf;

pub use tf::{EncodeError, TfEncoder, TfMatrix};
