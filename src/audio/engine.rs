use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use super::error::EngineError;
use super::types::{AudioCommand, AudioData, AudioEvent};

/// How often (in output frames) to send position updates.
const POSITION_UPDATE_INTERVAL: usize = 2048;

struct EngineState {
    audio: Option<Arc<AudioData>>,
    /// Read head in source frames; fractional when source and output rates differ.
    position: f64,
    playing: bool,
    volume: f32,
    seek_epoch: u64,
    output_sample_rate: u32,
    frames_since_update: usize,
}

impl EngineState {
    fn new(output_sample_rate: u32) -> Self {
        Self {
            audio: None,
            position: 0.0,
            playing: false,
            volume: 1.0,
            seek_epoch: 0,
            output_sample_rate,
            frames_since_update: 0,
        }
    }

    fn position_secs(&self) -> f64 {
        match &self.audio {
            Some(audio) if audio.sample_rate > 0 => self.position / audio.sample_rate as f64,
            _ => 0.0,
        }
    }

    fn report_position(&self, event_tx: &Sender<AudioEvent>) {
        let _ = event_tx.try_send(AudioEvent::PositionChanged {
            seconds: self.position_secs(),
            epoch: self.seek_epoch,
        });
    }

    fn handle_command(&mut self, cmd: AudioCommand, event_tx: &Sender<AudioEvent>) {
        match cmd {
            AudioCommand::LoadAudio(data) => {
                self.audio = Some(data);
                self.position = 0.0;
                self.playing = false;
                self.frames_since_update = 0;
            }
            AudioCommand::Play => {
                if self.audio.is_some() {
                    self.playing = true;
                }
            }
            AudioCommand::Pause => {
                self.playing = false;
            }
            AudioCommand::Seek { seconds, epoch } => {
                self.seek_epoch = epoch;
                if let Some(audio) = &self.audio {
                    let frame = (seconds.max(0.0) * audio.sample_rate as f64).floor();
                    self.position = frame.min(audio.num_frames() as f64);
                    self.report_position(event_tx);
                }
            }
            AudioCommand::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
            }
            AudioCommand::Unload => {
                self.playing = false;
                self.audio = None;
                self.position = 0.0;
            }
        }
    }

    /// Fill the output buffer, resampling linearly from the source rate.
    fn fill_buffer(&mut self, output: &mut [f32], channels: u16, event_tx: &Sender<AudioEvent>) {
        if !self.playing {
            output.fill(0.0);
            return;
        }

        let audio = match &self.audio {
            Some(a) => a.clone(),
            None => {
                output.fill(0.0);
                return;
            }
        };

        let audio_channels = audio.channels.max(1) as usize;
        let out_channels = channels.max(1) as usize;
        let total_frames = audio.num_frames();
        let step = audio.sample_rate as f64 / self.output_sample_rate.max(1) as f64;

        for (out_frame, frame) in output.chunks_mut(out_channels).enumerate() {
            if self.position >= total_frames as f64 {
                self.playing = false;
                let _ = event_tx.try_send(AudioEvent::PlaybackFinished);
                let written = out_frame * out_channels;
                output[written..].fill(0.0);
                return;
            }

            let idx = self.position.floor() as usize;
            let frac = (self.position - idx as f64) as f32;
            let next = (idx + 1).min(total_frames.saturating_sub(1));
            for (c, slot) in frame.iter_mut().enumerate() {
                let src_c = c % audio_channels;
                let s0 = audio.samples[idx * audio_channels + src_c];
                let s1 = audio.samples[next * audio_channels + src_c];
                *slot = (s0 + (s1 - s0) * frac) * self.volume;
            }

            self.position += step;
            self.frames_since_update += 1;
            if self.frames_since_update >= POSITION_UPDATE_INTERVAL {
                self.frames_since_update = 0;
                self.report_position(event_tx);
            }
        }
    }
}

/// Spawn the audio engine thread and return command/event channels.
pub fn spawn_engine() -> Result<(Sender<AudioCommand>, Receiver<AudioEvent>), EngineError> {
    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded::<AudioCommand>(64);
    let (event_tx, event_rx) = crossbeam_channel::bounded::<AudioEvent>(256);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(EngineError::NoOutputDevice)?;

    let config = device.default_output_config()?;

    let sample_rate = config.sample_rate();
    let channels = config.channels();
    let sample_format = config.sample_format();

    let mut state = EngineState::new(sample_rate);
    let event_tx_clone = event_tx.clone();
    let error_tx = event_tx.clone();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                while let Ok(cmd) = cmd_rx.try_recv() {
                    state.handle_command(cmd, &event_tx_clone);
                }
                state.fill_buffer(data, channels, &event_tx_clone);
            },
            move |err| {
                tracing::error!("Audio stream error: {err}");
                let _ = error_tx.try_send(AudioEvent::Error(err.to_string()));
            },
            None,
        )?,
        other => return Err(EngineError::UnsupportedFormat(format!("{other:?}"))),
    };

    stream.play()?;

    tracing::info!(sample_rate, channels, "Audio output started");

    // The stream stops when dropped, so park it on its own thread.
    std::thread::Builder::new()
        .name("audio-keepalive".into())
        .spawn(move || {
            let _stream = stream;
            loop {
                std::thread::park();
            }
        })
        .map_err(EngineError::Spawn)?;

    Ok((cmd_tx, event_rx))
}
