//! Decoding and playback of stem audio.

pub mod decoder;
pub mod engine;
pub mod error;
pub mod types;

pub use decoder::{SampleDecoder, SymphoniaDecoder, SUPPORTED_EXTENSIONS};
pub use error::{DecodeError, EngineError};
pub use types::{AudioCommand, AudioData, AudioEvent, PlaybackStatus, SampleBuffer};
