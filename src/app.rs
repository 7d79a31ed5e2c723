use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use iced::keyboard;
use iced::task;
use iced::widget::{canvas, center, column, container, text};
use iced::{Element, Length, Subscription, Task, Theme};

use crate::audio::decoder::{
    is_supported_audio, SampleDecoder, SymphoniaDecoder, SUPPORTED_EXTENSIONS,
};
use crate::audio::engine;
use crate::audio::types::*;
use crate::config::WaveformConfig;
use crate::ui::controls::{self, ControlMessage, VolumeControl};
use crate::ui::waveform::{WaveformMessage, WaveformView};
use crate::waveform::{
    analyze, LoadGate, PlaybackCursor, SourceAnalysis, SourceKey, StemSource, SummaryCache,
    Tagged,
};

/// Seconds moved by the arrow keys.
const NUDGE_SECONDS: f64 = 5.0;

pub struct App {
    config: WaveformConfig,
    decoder: Arc<dyn SampleDecoder>,

    // Audio engine channels
    cmd_tx: Option<Sender<AudioCommand>>,
    event_rx: Option<Receiver<AudioEvent>>,

    // Transport
    status: PlaybackStatus,
    volume: VolumeControl,
    cursor: PlaybackCursor,
    has_audio: bool,

    // Stem
    filename: Option<String>,
    error: Option<String>,
    degraded: bool,
    loading: bool,

    // Waveform
    waveform_view: WaveformView,
    loader: LoadGate,
    load_handle: Option<task::Handle>,
    pending_key: Option<SourceKey>,
    cache: SummaryCache,
}

#[derive(Debug, Clone)]
pub enum Message {
    EngineReady(Result<(Sender<AudioCommand>, Receiver<AudioEvent>), String>),
    StemAnalyzed(Tagged<SourceAnalysis>),
    Control(ControlMessage),
    Waveform(WaveformMessage),
    Tick,
    KeyEvent(keyboard::Event),
    FileDialogResult(Option<PathBuf>),
}

fn boot(config: WaveformConfig) -> (App, Task<Message>) {
    let app = App {
        waveform_view: WaveformView::new(config.palette),
        config,
        decoder: Arc::new(SymphoniaDecoder),
        cmd_tx: None,
        event_rx: None,
        status: PlaybackStatus::Stopped,
        volume: VolumeControl::default(),
        cursor: PlaybackCursor::new(),
        has_audio: false,
        filename: None,
        error: None,
        degraded: false,
        loading: false,
        loader: LoadGate::new(),
        load_handle: None,
        pending_key: None,
        cache: SummaryCache::new(),
    };

    let task = Task::perform(
        async {
            match tokio::task::spawn_blocking(engine::spawn_engine).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("Audio engine task failed: {e}")),
            }
        },
        Message::EngineReady,
    );

    (app, task)
}

fn title(app: &App) -> String {
    match &app.filename {
        Some(name) => format!("Stemview - {name}"),
        None => "Stemview".to_string(),
    }
}

impl App {
    fn send(&self, cmd: AudioCommand) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(cmd);
        }
    }

    fn sync_playhead(&mut self) {
        self.waveform_view.playback = self.cursor.state();
    }

    fn seek_to(&mut self, seconds: f64) {
        if let Some((seconds, epoch)) = self.cursor.seek(seconds) {
            self.send(AudioCommand::Seek { seconds, epoch });
            self.sync_playhead();
        }
    }

    /// Start analyzing `path`, superseding any load still in flight.
    fn load_stem(&mut self, path: PathBuf) -> Task<Message> {
        if !is_supported_audio(&path) {
            tracing::warn!(path = %path.display(), "Rejected unsupported file");
            self.error = Some(format!(
                "Unsupported file type; expected one of: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            ));
            return Task::none();
        }
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
        }
        let ticket = self.loader.begin();
        let resolution = self.config.resolution;

        let key = match SourceKey::probe(&path) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::debug!(path = %path.display(), "Cannot stat stem: {err}");
                None
            }
        };
        let cached = key
            .as_ref()
            .and_then(|key| self.cache.get(key, resolution));
        if cached.is_some() {
            tracing::debug!(path = %path.display(), "Reusing cached waveform summary");
        }
        self.pending_key = key;
        self.loading = true;

        let (task, handle) = Task::perform(
            analyze(
                self.decoder.clone(),
                StemSource::from_path(path),
                resolution,
                cached,
            ),
            move |analysis| Message::StemAnalyzed(ticket.tag(analysis)),
        )
        .abortable();
        self.load_handle = Some(handle);
        task
    }

    fn commit_stem(&mut self, analysis: SourceAnalysis) {
        self.load_handle = None;
        self.loading = false;

        if let Some(key) = self.pending_key.take() {
            self.cache
                .insert(key, self.config.resolution, analysis.summary.clone());
        }

        self.filename = analysis
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        self.degraded = analysis.is_degraded();
        self.error = analysis.failure;
        self.status = PlaybackStatus::Stopped;

        let epoch = self.cursor.load(analysis.duration);
        self.waveform_view
            .set_summary(analysis.summary, analysis.duration);
        self.sync_playhead();

        match analysis.audio {
            Some(audio) => {
                self.has_audio = true;
                self.send(AudioCommand::LoadAudio(audio));
            }
            None => {
                self.has_audio = false;
                self.send(AudioCommand::Unload);
            }
        }
        // Engine reports carry this epoch from here on.
        self.send(AudioCommand::Seek {
            seconds: 0.0,
            epoch,
        });
    }
}

fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::EngineReady(result) => match result {
            Ok((tx, rx)) => {
                let _ = tx.send(AudioCommand::SetVolume(app.volume.output()));
                app.cmd_tx = Some(tx);
                app.event_rx = Some(rx);
                Task::none()
            }
            Err(e) => {
                tracing::error!("Audio engine unavailable: {e}");
                app.error = Some(format!("Audio engine error: {e}"));
                Task::none()
            }
        },
        Message::Control(ctrl) => match ctrl {
            ControlMessage::OpenFile => Task::perform(
                async {
                    let handle = rfd::AsyncFileDialog::new()
                        .add_filter("Audio", SUPPORTED_EXTENSIONS)
                        .pick_file()
                        .await;
                    handle.map(|h| h.path().to_path_buf())
                },
                Message::FileDialogResult,
            ),
            ControlMessage::PlayPause => {
                if app.has_audio {
                    match app.status {
                        PlaybackStatus::Playing => {
                            app.send(AudioCommand::Pause);
                            app.status = PlaybackStatus::Paused;
                        }
                        _ => {
                            app.send(AudioCommand::Play);
                            app.status = PlaybackStatus::Playing;
                        }
                    }
                }
                Task::none()
            }
            ControlMessage::Stop => {
                app.send(AudioCommand::Pause);
                app.status = PlaybackStatus::Stopped;
                app.seek_to(0.0);
                Task::none()
            }
            ControlMessage::VolumeChanged(level) => {
                app.volume.set_level(level);
                app.send(AudioCommand::SetVolume(app.volume.output()));
                Task::none()
            }
            ControlMessage::ToggleMute => {
                app.volume.toggle_mute();
                app.send(AudioCommand::SetVolume(app.volume.output()));
                Task::none()
            }
        },
        Message::FileDialogResult(path) => match path {
            Some(path) => app.load_stem(path),
            None => Task::none(),
        },
        Message::StemAnalyzed(tagged) => {
            if let Some(analysis) = app.loader.accept(tagged) {
                app.commit_stem(analysis);
            }
            Task::none()
        }
        Message::Waveform(WaveformMessage::Seek(time)) => {
            app.seek_to(time);
            Task::none()
        }
        Message::Tick => {
            let events: Vec<AudioEvent> = match &app.event_rx {
                Some(rx) => rx.try_iter().collect(),
                None => Vec::new(),
            };
            for event in events {
                match event {
                    AudioEvent::PositionChanged { seconds, epoch } => {
                        app.cursor.advance(seconds, epoch);
                    }
                    AudioEvent::PlaybackFinished => {
                        app.status = PlaybackStatus::Stopped;
                        app.seek_to(0.0);
                    }
                    AudioEvent::Error(e) => {
                        app.error = Some(e);
                    }
                }
            }
            app.sync_playhead();
            Task::none()
        }
        Message::KeyEvent(key_event) => match key_event {
            keyboard::Event::KeyPressed {
                key, modifiers: _, ..
            } => match key.as_ref() {
                keyboard::Key::Named(keyboard::key::Named::Space) => {
                    update(app, Message::Control(ControlMessage::PlayPause))
                }
                keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => {
                    app.seek_to(app.cursor.current_time() - NUDGE_SECONDS);
                    Task::none()
                }
                keyboard::Key::Named(keyboard::key::Named::ArrowRight) => {
                    app.seek_to(app.cursor.current_time() + NUDGE_SECONDS);
                    Task::none()
                }
                _ => Task::none(),
            },
            _ => Task::none(),
        },
    }
}

fn view(app: &App) -> Element<'_, Message> {
    let controls = controls::view_controls(
        app.status,
        app.cursor.current_time(),
        app.cursor.duration(),
        app.volume,
        app.has_audio,
    )
    .map(Message::Control);

    let height = Length::Fixed(app.config.height_px as f32);
    let waveform: Element<Message> = if app.waveform_view.summary.is_some() {
        let canvas_el: Element<WaveformMessage> = canvas::Canvas::new(&app.waveform_view)
            .width(Length::Fill)
            .height(height)
            .into();
        canvas_el.map(Message::Waveform)
    } else if app.loading {
        center(text("Analyzing audio...").size(16))
            .width(Length::Fill)
            .height(height)
            .into()
    } else {
        center(text("Open a stem to begin").size(18))
            .width(Length::Fill)
            .height(height)
            .into()
    };

    let mut content = column![controls, waveform].spacing(5);

    if app.loading && app.waveform_view.summary.is_some() {
        content = content.push(container(text("Analyzing audio...").size(14)).padding(10));
    }

    if app.degraded {
        content = content.push(
            container(
                text("Waveform could not be analyzed; showing a placeholder")
                    .color(iced::Color::from_rgb(1.0, 0.8, 0.3)),
            )
            .padding(10),
        );
    }

    if let Some(err) = &app.error {
        content = content.push(
            container(text(format!("Error: {err}")).color(iced::Color::from_rgb(1.0, 0.3, 0.3)))
                .padding(10),
        );
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn subscription(_app: &App) -> Subscription<Message> {
    let tick =
        iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick);

    let keys = keyboard::listen().map(Message::KeyEvent);

    Subscription::batch([tick, keys])
}

fn theme(_app: &App) -> Theme {
    Theme::Dark
}

pub fn run(config: WaveformConfig) -> iced::Result {
    iced::application(move || boot(config.clone()), update, view)
        .title(title)
        .subscription(subscription)
        .theme(theme)
        .window_size((1000.0, 400.0))
        .run()
}
