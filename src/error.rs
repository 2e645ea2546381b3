use thiserror::Error;

/// Main error type for readme-ai operations
#[derive(Error, Debug)]
pub enum ReadmeAiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Generation backend error: {0}")]
    Generation(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
}

pub type Result<T> = std::result::Result<T, ReadmeAiError>;
