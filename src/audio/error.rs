use std::path::PathBuf;

use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

/// Errors produced while turning encoded audio into samples.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to probe format: {0}")]
    Probe(#[source] SymphoniaError),
    #[error("No default track found")]
    NoTrack,
    #[error("No sample rate in track")]
    NoSampleRate,
    #[error("Failed to create decoder: {0}")]
    Codec(#[source] SymphoniaError),
    #[error("Error reading packet: {0}")]
    Packet(#[source] SymphoniaError),
    #[error("Decode error: {0}")]
    Decode(#[source] SymphoniaError),
}

/// Errors raised while opening the audio output stream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No audio output device found")]
    NoOutputDevice,
    #[error("Failed to get output config: {0}")]
    OutputConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("Failed to start stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("Failed to spawn keepalive thread: {0}")]
    Spawn(#[source] std::io::Error),
}
