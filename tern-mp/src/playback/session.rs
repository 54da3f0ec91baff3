//! Playback session state
//!
//! One session per engine: the current item, transport state, progress, and
//! the pending queue. The session maintains the invariant that a missing
//! current item always means Idle transport.

use serde::Serialize;
use tern_common::events::{EngineKind, QueueItemInfo, TransportState};
use tern_common::model::{EntryRef, MediaDescriptor, MediaId};

use crate::playback::queue::{PlayQueue, QueueItem};

/// Live playback state owned by one engine
#[derive(Debug)]
pub struct PlaybackSession {
    current: Option<QueueItem>,
    transport: TransportState,
    position_seconds: f64,
    duration_seconds: f64,
    last_error: Option<String>,
    pub(crate) queue: PlayQueue,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            current: None,
            transport: TransportState::Idle,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            last_error: None,
            queue: PlayQueue::new(),
        }
    }

    pub fn current(&self) -> Option<&QueueItem> {
        self.current.as_ref()
    }

    pub fn current_media_id(&self) -> Option<MediaId> {
        self.current.as_ref().map(QueueItem::media_id)
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn position_seconds(&self) -> f64 {
        self.position_seconds
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Install a new current item and enter Loading
    ///
    /// Resets position to zero and discards any previous error. The queue is
    /// untouched: replacing `current` never consumes queued items.
    pub fn begin(&mut self, item: QueueItem, duration_hint_seconds: Option<f64>) {
        self.current = Some(item);
        self.transport = TransportState::Loading;
        self.position_seconds = 0.0;
        self.duration_seconds = duration_hint_seconds.unwrap_or(0.0).max(0.0);
        self.last_error = None;
    }

    /// Drop the current item and return to Idle
    ///
    /// Returns the cleared item. The queue survives.
    pub fn clear_current(&mut self) -> Option<QueueItem> {
        self.transport = TransportState::Idle;
        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;
        self.last_error = None;
        self.current.take()
    }

    /// Transition transport state; `current` must be present for any
    /// non-Idle target
    pub fn set_transport(&mut self, state: TransportState) {
        debug_assert!(
            state == TransportState::Idle || self.current.is_some(),
            "non-idle transport without a current item"
        );
        self.transport = state;
    }

    /// Record the duration reported by the resource at ready time
    pub fn set_duration(&mut self, duration_seconds: f64) {
        self.duration_seconds = duration_seconds.max(0.0);
    }

    /// Record a progress tick, clamped to `[0, duration]`
    ///
    /// A zero duration means "unknown"; progress is then only floored at 0.
    pub fn set_position(&mut self, position_seconds: f64) -> f64 {
        let clamped = if self.duration_seconds > 0.0 {
            position_seconds.clamp(0.0, self.duration_seconds)
        } else {
            position_seconds.max(0.0)
        };
        self.position_seconds = clamped;
        clamped
    }

    /// Record a load failure; the message is retained for display
    pub fn set_error(&mut self, message: String) {
        self.transport = TransportState::Error;
        self.last_error = Some(message);
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Read-only view for the API and render surface
    pub fn snapshot(&self, engine: EngineKind) -> SessionSnapshot {
        SessionSnapshot {
            engine,
            transport: self.transport,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            error: self.last_error.clone(),
            current: self.current.as_ref().map(|item| NowPlaying {
                media: item.media.clone(),
                entry: item.entry.clone(),
            }),
            queue: self.queue.infos(),
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

/// The currently loaded item, as exposed to observers
#[derive(Debug, Clone, Serialize)]
pub struct NowPlaying {
    pub media: MediaDescriptor,
    pub entry: EntryRef,
}

/// Serializable read-only session view
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub engine: EngineKind,
    pub transport: TransportState,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<NowPlaying>,
    pub queue: Vec<QueueItemInfo>,
}
