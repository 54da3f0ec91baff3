//! Event types for the Tern player event system
//!
//! Provides the shared event definitions and the EventBus used by the player
//! service and any in-process observers. Events are broadcast via EventBus
//! and serialized for SSE transmission to the render surface.

mod types;

pub use types::{EngineKind, QueueChangeTrigger, QueueItemInfo, TransportState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::{EntryRef, MediaId};

/// Player event types
///
/// All observable playback changes flow through this central enum so
/// subscribers can match exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Transport state changed on one engine
    ///
    /// Triggers:
    /// - SSE: update transport controls
    /// - Render surface: show/hide the player chrome
    TransportChanged {
        engine: EngineKind,
        old_state: TransportState,
        new_state: TransportState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new item became current and began loading
    ///
    /// Triggers:
    /// - SSE: update "now playing" display
    TrackStarted {
        engine: EngineKind,
        media: MediaId,
        entry: EntryRef,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The current item finished or was superseded
    ///
    /// `completed` is false when the item was cut short (stop, replacement,
    /// cross-engine stop) rather than reaching its natural end.
    TrackFinished {
        engine: EngineKind,
        media: MediaId,
        completed: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback progress update
    ///
    /// Pushed at the underlying resource's own cadence; position is already
    /// clamped to `[0, duration]` by the engine.
    PlaybackProgress {
        engine: EngineKind,
        media: MediaId,
        position_seconds: f64,
        duration_seconds: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Resource load or playback failure
    ///
    /// Triggers:
    /// - SSE: show retry affordance with the message
    PlaybackError {
        engine: EngineKind,
        media: MediaId,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents changed on one engine
    QueueChanged {
        engine: EngineKind,
        trigger: QueueChangeTrigger,
        queue: Vec<QueueItemInfo>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event type string for the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            PlayerEvent::TransportChanged { .. } => "TransportChanged",
            PlayerEvent::TrackStarted { .. } => "TrackStarted",
            PlayerEvent::TrackFinished { .. } => "TrackFinished",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::PlaybackError { .. } => "PlaybackError",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
        }
    }
}

/// Central event distribution bus
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if no subscriber is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_event() -> PlayerEvent {
        PlayerEvent::TransportChanged {
            engine: EngineKind::Audio,
            old_state: TransportState::Idle,
            new_state: TransportState::Loading,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(100);
        assert!(bus.emit(state_event()).is_err());
        // Lossy emission never fails
        bus.emit_lossy(state_event());
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.emit(state_event()).is_ok());

        let received = rx.recv().await.unwrap();
        match received {
            PlayerEvent::TransportChanged {
                old_state,
                new_state,
                ..
            } => {
                assert_eq!(old_state, TransportState::Idle);
                assert_eq!(new_state, TransportState::Loading);
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(state_event()).unwrap();
        assert_eq!(json["type"], "TransportChanged");
        assert_eq!(json["engine"], "audio");
        assert_eq!(json["new_state"], "loading");
    }
}
