use std::sync::Arc;

use iced::mouse;
use iced::widget::canvas::{self, Action, Event, Frame, Geometry, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::waveform::{
    map_click_to_time, render, DrawCommand, PlaybackState, Rgba, SurfaceGeometry,
    WaveformPalette, WaveformSummary,
};

const BACKDROP: Color = Color {
    r: 0.12,
    g: 0.12,
    b: 0.15,
    a: 1.0,
};

/// Canvas program that draws a stem summary with its playhead.
pub struct WaveformView {
    pub summary: Option<Arc<WaveformSummary>>,
    pub playback: PlaybackState,
    pub palette: WaveformPalette,
}

/// Interactions on the waveform.
#[derive(Debug, Clone)]
pub enum WaveformMessage {
    /// Time in seconds under the pointer.
    Seek(f64),
}

impl WaveformView {
    pub fn new(palette: WaveformPalette) -> Self {
        Self {
            summary: None,
            playback: PlaybackState::default(),
            palette,
        }
    }

    pub fn set_summary(&mut self, summary: Arc<WaveformSummary>, duration: f64) {
        self.summary = Some(summary);
        self.playback = PlaybackState {
            current_time: 0.0,
            duration,
        };
    }

    fn seek_message(&self, x: f32, bounds: Rectangle) -> Option<Action<WaveformMessage>> {
        let geometry = SurfaceGeometry::new(bounds.width, bounds.height);
        let time = map_click_to_time(x, geometry, self.playback.duration)?;
        Some(Action::publish(WaveformMessage::Seek(time)).and_capture())
    }
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a as f32 / 255.0)
}

/// Replay renderer output onto an iced frame.
pub fn apply_commands(frame: &mut Frame, commands: &[DrawCommand]) {
    for command in commands {
        match *command {
            DrawCommand::Clear { width, height } => {
                frame.fill_rectangle(Point::ORIGIN, Size::new(width, height), BACKDROP);
            }
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                if height > 0.0 {
                    frame.fill_rectangle(Point::new(x, y), Size::new(width, height), to_color(color));
                }
            }
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => {
                let line = Path::line(Point::new(from.0, from.1), Point::new(to.0, to.1));
                frame.stroke(
                    &line,
                    Stroke::default()
                        .with_color(to_color(color))
                        .with_width(width),
                );
            }
        }
    }
}

impl canvas::Program<WaveformMessage> for WaveformView {
    /// Whether a pointer drag started on the waveform is in progress.
    type State = bool;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        // Geometry and summary are both taken from this call, never from a previous frame.
        let geometry = SurfaceGeometry::new(bounds.width, bounds.height);
        let mut frame = Frame::new(renderer, bounds.size());

        match &self.summary {
            Some(summary) => {
                let commands = render(summary, self.playback, geometry, &self.palette);
                apply_commands(&mut frame, &commands);
            }
            None => {
                frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKDROP);
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<WaveformMessage>> {
        if let Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) = event {
            *state = false;
            return None;
        }

        // Absolute position so drags that leave the canvas still clamp to an edge.
        let position = cursor.position()?;
        let x = position.x - bounds.x;

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if !cursor.is_over(bounds) {
                    return None;
                }
                *state = true;
                self.seek_message(x, bounds)
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) if *state => self.seek_message(x, bounds),
            _ => None,
        }
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.playback.duration > 0.0 && cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}
