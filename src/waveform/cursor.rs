/// Snapshot of where playback is, handed to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    /// Seconds from the start.
    pub current_time: f64,
    /// Total length in seconds; 0 while nothing is loaded.
    pub duration: f64,
}

impl PlaybackState {
    /// Fraction of the duration already played, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Holds the playhead; written by the transport and by seeks.
///
/// Each seek bumps an epoch that travels to the transport with the seek command.
/// Transport reports tagged with an older epoch were produced before the seek
/// landed and are dropped, so a seek always wins over a stale tick.
#[derive(Debug, Default)]
pub struct PlaybackCursor {
    state: PlaybackState,
    seek_epoch: u64,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    /// Epoch of the most recent seek.
    pub fn seek_epoch(&self) -> u64 {
        self.seek_epoch
    }

    /// Reset for a newly loaded source.
    ///
    /// Bumps the seek epoch so reports still queued for the previous source are dropped.
    /// The returned epoch must reach the transport together with the rewind to 0.
    pub fn load(&mut self, duration: f64) -> u64 {
        self.seek_epoch += 1;
        self.state = PlaybackState {
            current_time: 0.0,
            duration: sanitize(duration),
        };
        self.seek_epoch
    }

    /// Apply a position report from the transport.
    ///
    /// Returns false when the report predates the latest seek and was ignored.
    pub fn advance(&mut self, seconds: f64, epoch: u64) -> bool {
        if epoch < self.seek_epoch {
            tracing::trace!(epoch, current = self.seek_epoch, "Dropping stale position report");
            return false;
        }
        self.state.current_time = self.clamp(seconds);
        true
    }

    /// Move the playhead to `seconds`, clamped to the loaded duration.
    ///
    /// Returns the clamped time and the new seek epoch, or `None` when nothing is loaded.
    pub fn seek(&mut self, seconds: f64) -> Option<(f64, u64)> {
        if self.state.duration <= 0.0 || seconds.is_nan() {
            return None;
        }
        self.seek_epoch += 1;
        self.state.current_time = self.clamp(seconds);
        Some((self.state.current_time, self.seek_epoch))
    }

    fn clamp(&self, seconds: f64) -> f64 {
        sanitize(seconds).min(self.state.duration)
    }
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else if seconds == f64::INFINITY {
        f64::MAX
    } else {
        0.0
    }
}
