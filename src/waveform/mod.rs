//! Waveform summaries, playback-aware rendering and pointer seeking.

pub mod cache;
pub mod cursor;
pub mod loader;
pub mod render;
pub mod seek;
pub mod summary;

pub use cache::{SourceKey, SummaryCache};
pub use cursor::{PlaybackCursor, PlaybackState};
pub use loader::{analyze, LoadGate, LoadTicket, SourceAnalysis, StemSource, Tagged};
pub use render::{render, DrawCommand, Rgba, WaveformPalette};
pub use seek::{map_click_to_time, time_to_x};
pub use summary::{SummaryOrigin, WaveformSummary, DEFAULT_RESOLUTION, MAX_RESOLUTION};

/// Size of the drawing surface, supplied fresh on every render or seek.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceGeometry {
    pub width_px: f32,
    pub height_px: f32,
}

impl SurfaceGeometry {
    pub fn new(width_px: f32, height_px: f32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// True when the surface has not been laid out yet.
    pub fn is_empty(&self) -> bool {
        !(self.width_px > 0.0 && self.height_px > 0.0)
    }
}
