use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Session count must be positive, got {0}")]
    InvalidCount(usize),

    #[error("Invalid simulation tables: {0}")]
    InvalidTables(String),

    #[error("Failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
}

pub type Result<T> = std::result::Result<T, Error>;
