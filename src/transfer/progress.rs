//! Throttled transfer progress

use crate::title::TitleId;
use std::time::{Duration, Instant};

/// Minimum spacing between two progress events of one transfer
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// A single progress notification for one transfer
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub title: TitleId,
    /// 0.0 to 100.0
    pub percentage: f64,
    /// When the throttle let this event through
    pub emitted_at: Instant,
}

impl ProgressEvent {
    /// Percentage rendered with two decimals, e.g. `"42.50"`
    pub fn percentage_string(&self) -> String {
        format!("{:.2}", self.percentage)
    }

    /// The closing event of a finished transfer
    pub fn complete(title: TitleId, at: Instant) -> Self {
        Self {
            title,
            percentage: 100.0,
            emitted_at: at,
        }
    }
}

/// Earliest instant a closing 100% event may follow `last`.
///
/// `None` when `last` already reported completion.
pub fn completion_due(last: Option<&ProgressEvent>, now: Instant) -> Option<Instant> {
    match last {
        None => Some(now),
        Some(event) if event.percentage >= 100.0 => None,
        Some(event) => Some(now.max(event.emitted_at + PROGRESS_INTERVAL)),
    }
}

/// Receives progress events. Implemented by the UI layer.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Byte counter plus rate limiter for exactly one transfer.
///
/// Never shared: each download or upload owns its own tracker.
#[derive(Debug)]
pub struct ProgressTracker {
    title: TitleId,
    total: u64,
    transferred: u64,
    last_emit: Option<Instant>,
}

impl ProgressTracker {
    /// `total` of zero means the size is unknown and no events are produced
    pub fn new(title: TitleId, total: u64) -> Self {
        Self {
            title,
            total,
            transferred: 0,
            last_emit: None,
        }
    }

    /// Bytes observed so far
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Record a chunk and forward an event to `sink` if the window allows
    pub fn record(&mut self, chunk_len: usize, sink: &dyn ProgressSink) {
        if let Some(event) = self.advance(chunk_len as u64, Instant::now()) {
            sink.on_progress(&event);
        }
    }

    /// Record `bytes` observed at `now`, returning the event to emit, if any.
    ///
    /// The first chunk always emits; later ones only once `PROGRESS_INTERVAL`
    /// has passed since the previous emission.
    pub fn advance(&mut self, bytes: u64, now: Instant) -> Option<ProgressEvent> {
        self.transferred += bytes;

        if self.total == 0 {
            return None;
        }
        if let Some(last) = self.last_emit {
            if now.saturating_duration_since(last) < PROGRESS_INTERVAL {
                return None;
            }
        }

        self.last_emit = Some(now);
        let percentage = (self.transferred as f64 / self.total as f64 * 100.0).min(100.0);
        Some(ProgressEvent {
            title: self.title.clone(),
            percentage,
            emitted_at: now,
        })
    }
}
