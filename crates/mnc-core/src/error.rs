use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Sketch error: {0}")]
    Sketch(String),

    #[error("Incompatible dimensions: {0}")]
    Dims(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}
