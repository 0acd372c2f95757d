use thiserror::Error;

/// Rejected construction parameters. Raised before anything is allocated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mask size {requested} (rounded to {rounded}) must be a power of two between 128 and 1024")]
    InvalidMaskSize { requested: usize, rounded: usize },
    #[error("dimension {0} must be between 1 and 20")]
    InvalidDimension(usize),
}

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),
    #[error("the {backend} kernel only supports masks up to {max}x{max}, {requested} requested")]
    UnsupportedMaskSize {
        backend: &'static str,
        requested: usize,
        max: usize,
    },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("malformed mask literal: {0}")]
    Parse(String),
}

pub type Result<T, E = OptimizerError> = std::result::Result<T, E>;
