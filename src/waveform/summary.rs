use std::num::NonZeroUsize;

use rand::Rng;

use crate::audio::types::SampleBuffer;

/// Bucket count used when nothing else is configured.
pub const DEFAULT_RESOLUTION: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(n) => n,
    None => unreachable!(),
};

/// Largest bucket count accepted from configuration.
pub const MAX_RESOLUTION: usize = 65_536;

/// Bounds of the synthetic fallback values.
const SYNTHETIC_MIN: f32 = 0.1;
const SYNTHETIC_MAX: f32 = 0.9;

/// Where a summary's values came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryOrigin {
    /// Computed from decoded samples.
    Analyzed,
    /// Supplied alongside the stem by the backend.
    Precomputed,
    /// Placeholder shape generated because analysis failed.
    Synthetic,
}

/// Fixed-length magnitude envelope of a stem, one value in `[0, 1]` per bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformSummary {
    buckets: Vec<f32>,
    origin: SummaryOrigin,
}

impl WaveformSummary {
    /// Reduce `samples` to `resolution` mean-magnitude buckets normalized to a peak of 1.0.
    ///
    /// Blocks are `len / resolution` samples wide. When there are fewer samples than
    /// buckets, each sample fills one bucket and the remaining buckets stay at zero.
    /// Silent or empty input yields all zeros.
    pub fn summarize(samples: SampleBuffer, resolution: NonZeroUsize) -> Self {
        Self {
            buckets: block_means(&samples.samples, resolution),
            origin: SummaryOrigin::Analyzed,
        }
    }

    /// Accept a summary computed elsewhere, re-bucketing it if its length differs.
    pub fn from_precomputed(values: &[f32], resolution: NonZeroUsize) -> Self {
        let buckets = if values.len() == resolution.get() {
            values
                .iter()
                .map(|&v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 })
                .collect()
        } else {
            block_means(values, resolution)
        };
        Self {
            buckets,
            origin: SummaryOrigin::Precomputed,
        }
    }

    /// Degraded placeholder used when the source could not be analyzed.
    pub fn synthetic(resolution: NonZeroUsize) -> Self {
        Self::synthetic_with_rng(resolution, &mut rand::rng())
    }

    /// Same as [`WaveformSummary::synthetic`] with a caller-provided generator.
    pub fn synthetic_with_rng<R: Rng>(resolution: NonZeroUsize, rng: &mut R) -> Self {
        let buckets = (0..resolution.get())
            .map(|_| rng.random_range(SYNTHETIC_MIN..=SYNTHETIC_MAX))
            .collect();
        Self {
            buckets,
            origin: SummaryOrigin::Synthetic,
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn origin(&self) -> SummaryOrigin {
        self.origin
    }

    /// True when the values are a placeholder rather than the real signal.
    pub fn is_degraded(&self) -> bool {
        self.origin == SummaryOrigin::Synthetic
    }
}

fn block_means(samples: &[f32], resolution: NonZeroUsize) -> Vec<f32> {
    let buckets = resolution.get();
    let block_size = (samples.len() / buckets).max(1);

    let mut means: Vec<f32> = (0..buckets)
        .map(|i| {
            let start = (i * block_size).min(samples.len());
            let end = (start + block_size).min(samples.len());
            let block = &samples[start..end];
            if block.is_empty() {
                return 0.0;
            }
            let sum: f64 = block
                .iter()
                .map(|&s| if s.is_finite() { s.abs() as f64 } else { 0.0 })
                .sum();
            (sum / block.len() as f64) as f32
        })
        .collect();

    let peak = means.iter().copied().fold(0.0_f32, f32::max);
    if peak > 0.0 {
        for value in &mut means {
            *value /= peak;
        }
    }
    means
}
