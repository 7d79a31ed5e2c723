use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::summary::WaveformSummary;

/// Identity of an audio source on disk; changes whenever the file is rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceKey {
    pub fn probe(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

struct CacheEntry {
    key: SourceKey,
    resolution: NonZeroUsize,
    summary: Arc<WaveformSummary>,
}

/// Stems remembered before the least recently used one is dropped.
pub const DEFAULT_CAPACITY: usize = 32;

/// Summaries per stem path, reused until the file or the resolution changes.
pub struct SummaryCache {
    entries: HashMap<PathBuf, CacheEntry>,
    order: VecDeque<PathBuf>,
    max_entries: usize,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `max_entries` stems (at least one).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&mut self, key: &SourceKey, resolution: NonZeroUsize) -> Option<Arc<WaveformSummary>> {
        let entry = self.entries.get(&key.path)?;
        if entry.key != *key || entry.resolution != resolution {
            return None;
        }
        let summary = entry.summary.clone();
        self.touch(&key.path);
        Some(summary)
    }

    /// Remember `summary` for `key`. Degraded summaries are not kept so the next load retries.
    pub fn insert(&mut self, key: SourceKey, resolution: NonZeroUsize, summary: Arc<WaveformSummary>) {
        if summary.is_degraded() {
            self.entries.remove(&key.path);
            self.order.retain(|path| path != &key.path);
            return;
        }
        tracing::debug!(path = %key.path.display(), "Caching waveform summary");
        let path = key.path.clone();
        self.entries.insert(
            path.clone(),
            CacheEntry {
                key,
                resolution,
                summary,
            },
        );
        self.touch(&path);
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, path: &Path) {
        self.order.retain(|existing| existing != path);
        self.order.push_back(path.to_path_buf());
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            tracing::trace!(path = %oldest.display(), "Evicting waveform summary");
            self.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::audio::types::SampleBuffer;

    fn n(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).expect("non-zero")
    }

    fn summary() -> Arc<WaveformSummary> {
        Arc::new(WaveformSummary::summarize(
            SampleBuffer::new(vec![0.25, -0.5, 0.75, -1.0], 4),
            n(4),
        ))
    }

    #[test]
    fn hit_for_unchanged_source() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"RIFF").expect("write");
        let key = SourceKey::probe(file.path()).expect("probe");

        let mut cache = SummaryCache::new();
        cache.insert(key.clone(), n(4), summary());
        assert_eq!(cache.get(&key, n(4)), Some(summary()));
        assert_eq!(cache.get(&key, n(8)), None);
    }

    #[test]
    fn miss_after_source_changes() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"RIFF").expect("write");
        let before = SourceKey::probe(file.path()).expect("probe");

        let mut cache = SummaryCache::new();
        cache.insert(before, n(4), summary());

        file.write_all(b"more bytes").expect("write");
        file.flush().expect("flush");
        let after = SourceKey::probe(file.path()).expect("probe");
        assert_eq!(cache.get(&after, n(4)), None);
    }

    #[test]
    fn degraded_summaries_are_not_cached() {
        let key = SourceKey {
            path: PathBuf::from("broken.wav"),
            len: 3,
            modified: None,
        };
        let mut cache = SummaryCache::new();
        cache.insert(key.clone(), n(4), Arc::new(WaveformSummary::synthetic(n(4))));
        assert!(cache.is_empty());
        assert_eq!(cache.get(&key, n(4)), None);
    }

    fn key(name: &str) -> SourceKey {
        SourceKey {
            path: PathBuf::from(name),
            len: 4,
            modified: None,
        }
    }

    #[test]
    fn evicts_least_recently_used_stem() {
        let mut cache = SummaryCache::with_capacity(2);
        cache.insert(key("drums.wav"), n(4), summary());
        cache.insert(key("bass.wav"), n(4), summary());
        // Touch drums so bass becomes the oldest.
        assert!(cache.get(&key("drums.wav"), n(4)).is_some());
        cache.insert(key("vocals.wav"), n(4), summary());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("bass.wav"), n(4)).is_none());
        assert!(cache.get(&key("drums.wav"), n(4)).is_some());
        assert!(cache.get(&key("vocals.wav"), n(4)).is_some());
    }

    #[test]
    fn reinserting_a_stem_does_not_grow_the_cache() {
        let mut cache = SummaryCache::with_capacity(2);
        for _ in 0..5 {
            cache.insert(key("drums.wav"), n(4), summary());
        }
        assert_eq!(cache.len(), 1);
    }
}
