//! iced widgets for the stem viewer.

pub mod controls;
pub mod waveform;
