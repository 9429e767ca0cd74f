use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtradError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Track metadata error: {0}")]
    Metadata(String),

    #[error("Subtitle extraction error: {0}")]
    Extraction(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("No subtitle track matching the language policy in {0}")]
    TrackNotFound(String),
}

pub type Result<T> = std::result::Result<T, SubtradError>;
