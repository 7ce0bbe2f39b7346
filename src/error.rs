//! Error types for lipsonic

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LipSonicError {
    #[error("Asset IO error: {0}")]
    AssetIo(String),

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, LipSonicError>;
