use super::cursor::PlaybackState;
use super::seek::time_to_x;
use super::summary::WaveformSummary;
use super::SurfaceGeometry;

/// Width of the playhead line in pixels.
const PROGRESS_LINE_WIDTH: f32 = 2.0;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

/// Colors the renderer picks from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveformPalette {
    pub played: Rgba,
    pub unplayed: Rgba,
    pub progress_line: Rgba,
}

impl Default for WaveformPalette {
    fn default() -> Self {
        Self {
            played: Rgba::rgb(76, 179, 255),
            unplayed: Rgba::rgba(138, 143, 152, 77),
            progress_line: Rgba::rgb(76, 179, 255),
        }
    }
}

/// Surface-independent drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Wipe the whole surface.
    Clear { width: f32, height: f32 },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgba,
    },
}

/// Whether bar `index` of `bars` lies before the playhead.
pub fn is_played(index: usize, bars: usize, progress: f64) -> bool {
    bars > 0 && (index as f64 / bars as f64) < progress
}

/// Lay out mirrored magnitude bars and the playhead for one frame.
///
/// Pure: the same summary, playback state and geometry always produce the same commands.
/// A surface with no area produces nothing.
pub fn render(
    summary: &WaveformSummary,
    playback: PlaybackState,
    geometry: SurfaceGeometry,
    palette: &WaveformPalette,
) -> Vec<DrawCommand> {
    if geometry.is_empty() {
        return Vec::new();
    }

    let width = geometry.width_px;
    let height = geometry.height_px;
    let values = summary.values();
    let mut commands = Vec::with_capacity(2 + values.len() * 2);
    commands.push(DrawCommand::Clear { width, height });

    let bars = values.len();
    if bars > 0 {
        let progress = playback.progress();
        let bar_width = width / bars as f32;
        let rect_width = (bar_width - 1.0).max(1.0);
        let center_y = height / 2.0;

        for (i, &value) in values.iter().enumerate() {
            let bar_height = value * center_y;
            let x = i as f32 * bar_width;
            let color = if is_played(i, bars, progress) {
                palette.played
            } else {
                palette.unplayed
            };

            commands.push(DrawCommand::FillRect {
                x,
                y: center_y - bar_height,
                width: rect_width,
                height: bar_height,
                color,
            });
            commands.push(DrawCommand::FillRect {
                x,
                y: center_y,
                width: rect_width,
                height: bar_height,
                color,
            });
        }
    }

    if playback.duration > 0.0 {
        let x = time_to_x(playback.current_time, geometry, playback.duration);
        commands.push(DrawCommand::Line {
            from: (x, 0.0),
            to: (x, height),
            width: PROGRESS_LINE_WIDTH,
            color: palette.progress_line,
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    use crate::audio::types::SampleBuffer;

    fn summary_of(values: &[f32]) -> WaveformSummary {
        let n = NonZeroUsize::new(values.len()).expect("non-empty");
        WaveformSummary::from_precomputed(values, n)
    }

    fn played_flags(commands: &[DrawCommand], palette: &WaveformPalette) -> Vec<bool> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .step_by(2)
            .map(|color| color == palette.played)
            .collect()
    }

    fn state(current_time: f64, duration: f64) -> PlaybackState {
        PlaybackState {
            current_time,
            duration,
        }
    }

    #[test]
    fn half_progress_marks_first_half_of_ten_bars() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[0.5; 10]);
        let commands = render(&summary, state(5.0, 10.0), SurfaceGeometry::new(100.0, 40.0), &palette);
        let flags = played_flags(&commands, &palette);
        assert_eq!(flags, [true, true, true, true, true, false, false, false, false, false]);
    }

    #[test]
    fn zero_and_full_progress_bounds() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[0.5; 10]);
        let geometry = SurfaceGeometry::new(100.0, 40.0);

        let start = render(&summary, state(0.0, 10.0), geometry, &palette);
        assert!(played_flags(&start, &palette).iter().all(|&p| !p));

        let end = render(&summary, state(10.0, 10.0), geometry, &palette);
        assert!(played_flags(&end, &palette).iter().all(|&p| p));

        let unloaded = render(&summary, state(3.0, 0.0), geometry, &palette);
        assert!(played_flags(&unloaded, &palette).iter().all(|&p| !p));
    }

    #[test]
    fn bars_are_mirrored_around_center() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[1.0, 0.5]);
        let commands = render(&summary, state(0.0, 0.0), SurfaceGeometry::new(20.0, 100.0), &palette);
        assert_eq!(commands[0], DrawCommand::Clear { width: 20.0, height: 100.0 });
        assert_eq!(
            commands[1],
            DrawCommand::FillRect { x: 0.0, y: 0.0, width: 9.0, height: 50.0, color: palette.unplayed }
        );
        assert_eq!(
            commands[2],
            DrawCommand::FillRect { x: 0.0, y: 50.0, width: 9.0, height: 50.0, color: palette.unplayed }
        );
        assert_eq!(
            commands[3],
            DrawCommand::FillRect { x: 10.0, y: 25.0, width: 9.0, height: 25.0, color: palette.unplayed }
        );
        // No playhead without a duration.
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn narrow_surfaces_keep_one_pixel_bars() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[0.5; 500]);
        let commands = render(&summary, state(0.0, 1.0), SurfaceGeometry::new(200.0, 120.0), &palette);
        let min_width = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { width, .. } => Some(*width),
                _ => None,
            })
            .fold(f32::MAX, f32::min);
        assert_eq!(min_width, 1.0);
    }

    #[test]
    fn playhead_is_drawn_last_at_progress() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[0.3; 4]);
        let commands = render(&summary, state(30.0, 120.0), SurfaceGeometry::new(200.0, 120.0), &palette);
        assert_eq!(
            commands.last(),
            Some(&DrawCommand::Line {
                from: (50.0, 0.0),
                to: (50.0, 120.0),
                width: 2.0,
                color: palette.progress_line,
            })
        );
    }

    #[test]
    fn playhead_matches_forward_time_mapping() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[0.3; 4]);
        let geometry = SurfaceGeometry::new(640.0, 80.0);
        for playback in [state(0.0, 9.0), state(3.3, 9.0), state(12.0, 9.0)] {
            let commands = render(&summary, playback, geometry, &palette);
            let expected = time_to_x(playback.current_time, geometry, playback.duration);
            assert!(matches!(
                commands.last(),
                Some(DrawCommand::Line { from: (x, _), .. }) if *x == expected
            ));
        }
    }

    #[test]
    fn zero_sized_surface_draws_nothing() {
        let palette = WaveformPalette::default();
        let summary = WaveformSummary::summarize(
            SampleBuffer::new(vec![0.5; 64], 8_000),
            NonZeroUsize::new(8).expect("non-zero"),
        );
        assert!(render(&summary, state(1.0, 2.0), SurfaceGeometry::new(0.0, 120.0), &palette).is_empty());
        assert!(render(&summary, state(1.0, 2.0), SurfaceGeometry::new(300.0, 0.0), &palette).is_empty());
    }

    #[test]
    fn render_is_idempotent() {
        let palette = WaveformPalette::default();
        let summary = summary_of(&[0.1, 0.9, 0.4, 0.7]);
        let geometry = SurfaceGeometry::new(321.0, 77.0);
        let playback = state(1.3, 4.0);
        assert_eq!(
            render(&summary, playback, geometry, &palette),
            render(&summary, playback, geometry, &palette)
        );
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgba::from_hex("#4cb3ff"), Some(Rgba::rgb(0x4c, 0xb3, 0xff)));
        assert_eq!(Rgba::from_hex("8a8f984d"), Some(Rgba::rgba(0x8a, 0x8f, 0x98, 0x4d)));
        assert_eq!(Rgba::from_hex("#fff"), None);
        assert_eq!(Rgba::from_hex("#gggggg"), None);
    }
}
