//! Stem waveform analysis, playback-synchronized rendering and seeking.
//!
//! The [`waveform`] module is display-agnostic: it reduces decoded audio to a fixed
//! number of magnitude buckets, turns a summary plus playhead into draw commands, and maps
//! pointer positions back to time. [`ui`] and [`app`] host it in an iced window.

/// Desktop viewer wiring the pieces together.
pub mod app;
/// Audio decoding and playback.
pub mod audio;
/// TOML configuration.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
/// iced widgets.
pub mod ui;
/// Summaries, rendering and seeking.
pub mod waveform;
