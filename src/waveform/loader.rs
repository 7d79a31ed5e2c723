use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::decoder::{decode_file, SampleDecoder};
use crate::audio::types::AudioData;

use super::summary::WaveformSummary;

/// Reference to a stem handed over by the host.
#[derive(Clone, Debug)]
pub struct StemSource {
    pub path: PathBuf,
    /// Summary shipped with the stem, used instead of analyzing the audio.
    pub precomputed: Option<Vec<f32>>,
}

impl StemSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            precomputed: None,
        }
    }
}

/// Outcome of loading a stem: always carries a summary, even when decoding failed.
#[derive(Clone, Debug)]
pub struct SourceAnalysis {
    pub path: PathBuf,
    /// Decoded audio for playback; `None` when decoding failed.
    pub audio: Option<Arc<AudioData>>,
    pub summary: Arc<WaveformSummary>,
    pub duration: f64,
    /// Decode error message, if any.
    pub failure: Option<String>,
}

impl SourceAnalysis {
    pub fn is_degraded(&self) -> bool {
        self.summary.is_degraded()
    }
}

/// Identifies one load request of a waveform instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn tag<T>(self, value: T) -> Tagged<T> {
        Tagged {
            ticket: self,
            value,
        }
    }
}

/// A result stamped with the request that produced it.
#[derive(Clone, Debug)]
pub struct Tagged<T> {
    pub ticket: LoadTicket,
    pub value: T,
}

/// Generation counter that lets only the newest load request commit.
#[derive(Debug, Default)]
pub struct LoadGate {
    generation: u64,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Unwrap `tagged` if it belongs to the latest request; drop it otherwise.
    pub fn accept<T>(&self, tagged: Tagged<T>) -> Option<T> {
        if self.is_current(tagged.ticket) {
            Some(tagged.value)
        } else {
            tracing::debug!(
                ticket = tagged.ticket.0,
                current = self.generation,
                "Discarding superseded load result"
            );
            None
        }
    }
}

/// Decode and summarize a stem on the calling thread.
///
/// A cached or precomputed summary skips summarization; decoding still runs so the
/// audio is available for playback. Decode failures fall back to a synthetic summary.
pub fn analyze_blocking(
    decoder: &dyn SampleDecoder,
    source: &StemSource,
    resolution: NonZeroUsize,
    cached: Option<Arc<WaveformSummary>>,
) -> SourceAnalysis {
    let decoded = decode_file(decoder, &source.path);

    let provided = match &source.precomputed {
        Some(values) => Some(Arc::new(WaveformSummary::from_precomputed(values, resolution))),
        None => cached,
    };

    match decoded {
        Ok(audio) => {
            let duration = audio.duration;
            let summary = match provided {
                Some(summary) => summary,
                None => Arc::new(WaveformSummary::summarize(audio.to_mono(), resolution)),
            };
            tracing::debug!(
                path = %source.path.display(),
                duration,
                origin = ?summary.origin(),
                "Analyzed stem"
            );
            SourceAnalysis {
                path: source.path.clone(),
                audio: Some(Arc::new(audio)),
                summary,
                duration,
                failure: None,
            }
        }
        Err(err) => {
            let summary =
                provided.unwrap_or_else(|| Arc::new(WaveformSummary::synthetic(resolution)));
            tracing::warn!(
                path = %source.path.display(),
                degraded = summary.is_degraded(),
                "Waveform analysis failed: {err}"
            );
            SourceAnalysis {
                path: source.path.clone(),
                audio: None,
                summary,
                duration: 0.0,
                failure: Some(err.to_string()),
            }
        }
    }
}

/// Run [`analyze_blocking`] on the blocking pool.
pub async fn analyze(
    decoder: Arc<dyn SampleDecoder>,
    source: StemSource,
    resolution: NonZeroUsize,
    cached: Option<Arc<WaveformSummary>>,
) -> SourceAnalysis {
    let path = source.path.clone();
    let job = tokio::task::spawn_blocking(move || {
        analyze_blocking(decoder.as_ref(), &source, resolution, cached)
    });
    match job.await {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::warn!(path = %path.display(), "Waveform analysis task failed: {err}");
            SourceAnalysis {
                path,
                audio: None,
                summary: Arc::new(WaveformSummary::synthetic(resolution)),
                duration: 0.0,
                failure: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::audio::error::DecodeError;
    use crate::waveform::summary::SummaryOrigin;

    struct FakeDecoder {
        audio: Option<AudioData>,
    }

    impl SampleDecoder for FakeDecoder {
        fn decode(&self, _bytes: Vec<u8>, _extension: Option<&str>) -> Result<AudioData, DecodeError> {
            self.audio.clone().ok_or(DecodeError::NoTrack)
        }
    }

    fn n(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).expect("non-zero")
    }

    fn stem_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .expect("temp file");
        file.write_all(b"encoded bytes").expect("write");
        file
    }

    fn tone() -> AudioData {
        AudioData {
            samples: [0.5_f32, -0.5].repeat(200),
            sample_rate: 100,
            channels: 1,
            duration: 4.0,
        }
    }

    #[test]
    fn gate_discards_superseded_results() {
        let mut gate = LoadGate::new();
        let first = gate.begin();
        let second = gate.begin();
        assert_eq!(gate.accept(first.tag("old")), None);
        assert_eq!(gate.accept(second.tag("new")), Some("new"));
    }

    #[test]
    fn decoded_audio_is_summarized() {
        let file = stem_file();
        let decoder = FakeDecoder { audio: Some(tone()) };
        let analysis = analyze_blocking(&decoder, &StemSource::from_path(file.path()), n(50), None);
        assert!(analysis.failure.is_none());
        assert!(!analysis.is_degraded());
        assert_eq!(analysis.duration, 4.0);
        assert_eq!(analysis.summary.values(), vec![1.0; 50].as_slice());
        assert!(analysis.audio.is_some());
    }

    #[test]
    fn decode_failure_degrades_to_synthetic_summary() {
        let file = stem_file();
        let decoder = FakeDecoder { audio: None };
        let analysis = analyze_blocking(&decoder, &StemSource::from_path(file.path()), n(500), None);
        assert!(analysis.is_degraded());
        assert_eq!(analysis.summary.len(), 500);
        assert!(analysis.summary.values().iter().all(|v| (0.1..=0.9).contains(v)));
        assert!(analysis.audio.is_none());
        assert_eq!(analysis.duration, 0.0);
        assert!(analysis.failure.is_some());
    }

    #[test]
    fn precomputed_summary_wins_over_analysis() {
        let file = stem_file();
        let decoder = FakeDecoder { audio: Some(tone()) };
        let source = StemSource {
            path: file.path().to_path_buf(),
            precomputed: Some(vec![0.1, 0.2, 0.3, 0.4]),
        };
        let analysis = analyze_blocking(&decoder, &source, n(4), None);
        assert_eq!(analysis.summary.origin(), SummaryOrigin::Precomputed);
        assert_eq!(analysis.summary.values(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn precomputed_summary_survives_decode_failure() {
        let file = stem_file();
        let decoder = FakeDecoder { audio: None };
        let source = StemSource {
            path: file.path().to_path_buf(),
            precomputed: Some(vec![0.5; 8]),
        };
        let analysis = analyze_blocking(&decoder, &source, n(8), None);
        assert!(!analysis.is_degraded());
        assert!(analysis.audio.is_none());
    }

    #[test]
    fn cached_summary_is_reused() {
        let file = stem_file();
        let decoder = FakeDecoder { audio: Some(tone()) };
        let cached = Arc::new(WaveformSummary::from_precomputed(&[0.3; 4], n(4)));
        let analysis = analyze_blocking(
            &decoder,
            &StemSource::from_path(file.path()),
            n(4),
            Some(cached.clone()),
        );
        assert!(Arc::ptr_eq(&analysis.summary, &cached));
        assert!(analysis.audio.is_some());
    }

    #[tokio::test]
    async fn analyze_runs_on_blocking_pool() {
        let file = stem_file();
        let decoder: Arc<dyn SampleDecoder> = Arc::new(FakeDecoder { audio: Some(tone()) });
        let analysis = analyze(decoder, StemSource::from_path(file.path()), n(10), None).await;
        assert_eq!(analysis.summary.len(), 10);
        assert!(!analysis.is_degraded());
    }

    #[tokio::test]
    async fn missing_file_is_degraded_not_fatal() {
        let decoder: Arc<dyn SampleDecoder> = Arc::new(FakeDecoder { audio: Some(tone()) });
        let source = StemSource::from_path("/nonexistent/drums.wav");
        let analysis = analyze(decoder, source, n(16), None).await;
        assert!(analysis.is_degraded());
        assert_eq!(analysis.summary.len(), 16);
    }
}
