use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::error::DecodeError;
use super::types::AudioData;

/// File extensions offered by the open dialog and accepted by [`is_supported_audio`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "aac", "m4a", "ogg", "aiff", "aif"];

/// Turns encoded audio bytes into interleaved samples.
///
/// Passed around as `Arc<dyn SampleDecoder>` so hosts and tests can swap the
/// platform decoder for something else.
pub trait SampleDecoder: Send + Sync {
    /// Decode `bytes`; `extension` is a format hint such as `"wav"`.
    fn decode(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData, DecodeError>;
}

/// Decoder backed by symphonia's default codec and format registries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SampleDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData, DecodeError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(DecodeError::Probe)?;

        let mut format = probed.format;

        let track = format.default_track().ok_or(DecodeError::NoTrack)?.clone();

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or(DecodeError::NoSampleRate)?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(DecodeError::Codec)?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(DecodeError::Packet(e)),
            };

            if packet.track_id() != track.id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Skipping undecodable packet: {e}");
                    continue;
                }
                Err(e) => return Err(DecodeError::Decode(e)),
            };

            let spec = *decoded.spec();
            let num_frames = decoded.capacity();

            let mut sample_buf = InterleavedBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }

        let num_frames = samples.len() / channels.max(1) as usize;
        let duration = num_frames as f64 / sample_rate as f64;

        tracing::debug!(sample_rate, channels, num_frames, "Decoded audio");

        Ok(AudioData {
            samples,
            sample_rate,
            channels,
            duration,
        })
    }
}

/// Read a file from disk and decode it with `decoder`.
pub fn decode_file(decoder: &dyn SampleDecoder, path: &Path) -> Result<AudioData, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decoder.decode(bytes, extension_of(path).as_deref())
}

/// Whether `path` carries one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_audio(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav writer");
            for &sample in samples {
                writer.write_sample(sample).expect("write sample");
            }
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_pcm_wav_bytes() {
        let samples: Vec<i16> = (0..800).map(|i| if i % 2 == 0 { 16_384 } else { -16_384 }).collect();
        let decoded = SymphoniaDecoder
            .decode(wav_bytes(1, &samples), Some("wav"))
            .expect("decode wav");
        assert_eq!(decoded.sample_rate, 8_000);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.num_frames(), 800);
        assert!((decoded.duration - 0.1).abs() < 1e-9);
        assert!((decoded.samples[0] - 0.5).abs() < 1e-3);
        assert!((decoded.samples[1] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn decodes_stereo_wav_duration_per_frame() {
        let samples = vec![0i16; 1_600];
        let decoded = SymphoniaDecoder
            .decode(wav_bytes(2, &samples), Some("wav"))
            .expect("decode stereo wav");
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.num_frames(), 800);
        assert!((decoded.duration - 0.1).abs() < 1e-9);
    }

    #[test]
    fn rejects_garbage_bytes() {
        let result = SymphoniaDecoder.decode(b"definitely not audio".to_vec(), Some("wav"));
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let result = decode_file(&SymphoniaDecoder, Path::new("/nonexistent/stem.wav"));
        assert!(matches!(result, Err(DecodeError::Read { .. })));
    }

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_audio(Path::new("drums.WAV")));
        assert!(is_supported_audio(Path::new("vocals.flac")));
        assert!(!is_supported_audio(Path::new("notes.txt")));
        assert!(!is_supported_audio(Path::new("no_extension")));
    }
}
