//! Error types for the beach comment explorer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load corpus: {0}")]
    DataLoad(String),

    #[error("Failed to build vector index: {0}")]
    IndexBuild(String),

    #[error("Retrieval failed: {0}")]
    Query(String),

    #[error("Language model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Single human-readable line shown in the chat view when an `ask` fails.
    ///
    /// Startup errors (DataLoad, Config) halt the process instead and never
    /// go through here.
    pub fn user_message(&self) -> String {
        match self {
            Error::IndexBuild(_) => {
                "Could not build the comment index. Check the embedding service and try again."
                    .to_string()
            }
            Error::Query(msg) => format!("Could not answer that question: {}", msg),
            Error::Model(_) => {
                "The language model did not return an answer. Please try again.".to_string()
            }
            other => format!("Unexpected error: {}", other),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::DataLoad(err.to_string())
    }
}
