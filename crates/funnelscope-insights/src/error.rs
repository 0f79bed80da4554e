use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid metrics: {0}")]
    InvalidMetrics(String),
}

pub type Result<T> = std::result::Result<T, Error>;
