use iced::widget::{button, container, row, slider, text, Column, Row};
use iced::{Alignment, Element, Length};

use crate::audio::types::PlaybackStatus;

#[derive(Debug, Clone)]
pub enum ControlMessage {
    PlayPause,
    Stop,
    VolumeChanged(f32),
    ToggleMute,
    OpenFile,
}

/// Volume level plus a mute switch that remembers the level underneath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeControl {
    level: f32,
    muted: bool,
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}

impl VolumeControl {
    /// Set the level from the slider. Dragging to zero counts as muting.
    pub fn set_level(&mut self, level: f32) {
        if level <= 0.0 {
            self.muted = true;
        } else {
            self.level = level.min(1.0);
            self.muted = false;
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain sent to the engine.
    pub fn output(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

/// Format seconds as M:SS.
pub fn format_time(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() {
        seconds.max(0.0) as u64
    } else {
        0
    };
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{mins}:{secs:02}")
}

/// Build the transport controls view.
pub fn view_controls<'a>(
    status: PlaybackStatus,
    position: f64,
    duration: f64,
    volume: VolumeControl,
    can_play: bool,
) -> Element<'a, ControlMessage> {
    let play_label = match status {
        PlaybackStatus::Playing => "Pause",
        _ => "Play",
    };

    let play_btn =
        button(text(play_label)).on_press_maybe(can_play.then_some(ControlMessage::PlayPause));
    let stop_btn = button(text("Stop")).on_press_maybe(can_play.then_some(ControlMessage::Stop));
    let open_btn = button(text("Open Stem")).on_press(ControlMessage::OpenFile);

    let time_display = text(format!(
        "{} / {}",
        format_time(position),
        format_time(duration)
    ))
    .size(16);

    let mute_label = if volume.is_muted() { "Unmute" } else { "Mute" };
    let mute_btn = button(text(mute_label)).on_press(ControlMessage::ToggleMute);
    let volume_label = text(format!("Volume: {:.0}%", volume.output() * 100.0)).size(14);
    let volume_slider =
        slider(0.0..=1.0, volume.output(), ControlMessage::VolumeChanged).step(0.01);

    let controls_row = Row::new()
        .spacing(10)
        .align_y(Alignment::Center)
        .push(open_btn)
        .push(play_btn)
        .push(stop_btn)
        .push(time_display);

    let volume_row = row![mute_btn, volume_label, volume_slider]
        .spacing(10)
        .align_y(Alignment::Center)
        .width(Length::Fixed(380.0));

    let full_row = Row::new()
        .spacing(20)
        .align_y(Alignment::Center)
        .push(controls_row)
        .push(volume_row);

    container(Column::new().push(full_row))
        .padding(10)
        .into()
}

#[cfg(test)]
mod tests {
    use super::{format_time, VolumeControl};

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(3_725.0), "62:05");
    }

    #[test]
    fn invalid_times_render_as_zero() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn mute_restores_previous_level() {
        let mut volume = VolumeControl::default();
        volume.set_level(0.4);
        volume.toggle_mute();
        assert!(volume.is_muted());
        assert_eq!(volume.output(), 0.0);
        volume.toggle_mute();
        assert_eq!(volume.output(), 0.4);
    }

    #[test]
    fn slider_to_zero_mutes_and_keeps_level() {
        let mut volume = VolumeControl::default();
        volume.set_level(0.7);
        volume.set_level(0.0);
        assert!(volume.is_muted());
        volume.toggle_mute();
        assert_eq!(volume.output(), 0.7);
        volume.set_level(1.5);
        assert_eq!(volume.output(), 1.0);
    }
}
