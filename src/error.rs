//! Error taxonomy for loading data and running the classifier.

use std::path::PathBuf;

use crate::data::field::EncodeError;

/// Errors raised by the data pipeline and the model.
///
/// Every variant is fatal for the operation that produced it: a load is
/// aborted, a forward pass returns nothing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A line of an input file does not have exactly two tab-separated columns.
    #[error("{}:{line}: expected 2 tab-separated columns, found {found}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    /// A token could not be mapped through a vocabulary that has no fallback.
    #[error("{}:{line}: {source}", path.display())]
    Vocabulary {
        path: PathBuf,
        line: usize,
        #[source]
        source: EncodeError,
    },

    /// Invalid construction parameters.
    #[error("configuration error: {0}")]
    Config(String),

    /// Forward-pass input does not match the expected shape.
    #[error("expected input of shape {expected}, got {actual:?}")]
    Shape {
        expected: String,
        actual: Vec<usize>,
    },

    /// An input file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
