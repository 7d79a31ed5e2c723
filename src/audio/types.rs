use std::sync::Arc;

/// Decoded audio data stored entirely in memory.
#[derive(Clone, Debug)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Duration in seconds.
    pub duration: f64,
}

impl AudioData {
    /// Total number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Mix down to mono, returning one sample per frame.
    pub fn to_mono(&self) -> SampleBuffer {
        let ch = self.channels.max(1) as usize;
        let samples = if ch == 1 {
            self.samples.clone()
        } else {
            self.samples
                .chunks_exact(ch)
                .map(|frame| frame.iter().sum::<f32>() / ch as f32)
                .collect()
        };
        SampleBuffer {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}

/// Mono samples handed to the summarizer. Consumed by summarization.
#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, 0 when the sample rate is unknown.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Commands sent from the UI thread to the audio thread.
#[derive(Debug, Clone)]
pub enum AudioCommand {
    LoadAudio(Arc<AudioData>),
    /// Drop the loaded audio, e.g. after a stem failed to decode.
    Unload,
    Play,
    Pause,
    /// Jump to `seconds`; position reports produced afterwards carry `epoch`.
    Seek { seconds: f64, epoch: u64 },
    SetVolume(f32),
}

/// Events sent from the audio thread to the UI thread.
#[derive(Debug, Clone)]
pub enum AudioEvent {
    PositionChanged { seconds: f64, epoch: u64 },
    PlaybackFinished,
    Error(String),
}

/// Current playback status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}
