//! Supporting types for playback events and session state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{EntryRef, MediaDescriptor};

/// Which playback engine an event or command concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Audio,
    Video,
}

impl EngineKind {
    /// The other engine
    pub fn sibling(self) -> EngineKind {
        match self {
            EngineKind::Audio => EngineKind::Video,
            EngineKind::Video => EngineKind::Audio,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Audio => write!(f, "audio"),
            EngineKind::Video => write!(f, "video"),
        }
    }
}

/// Transport state of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Nothing loaded
    Idle,
    /// Waiting for the underlying resource to report ready
    Loading,
    Playing,
    Paused,
    /// Current item reached its natural end
    Ended,
    /// Resource load or playback failed; message retained on the session
    Error,
}

impl TransportState {
    /// True for every state except Idle
    pub fn is_active(self) -> bool {
        !matches!(self, TransportState::Idle)
    }
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportState::Idle => write!(f, "idle"),
            TransportState::Loading => write!(f, "loading"),
            TransportState::Playing => write!(f, "playing"),
            TransportState::Paused => write!(f, "paused"),
            TransportState::Ended => write!(f, "ended"),
            TransportState::Error => write!(f, "error"),
        }
    }
}

/// Why a queue changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueChangeTrigger {
    /// Item appended by an explicit user add
    Enqueued,
    /// Item removed by an explicit user remove
    Removed,
    /// Head consumed by natural-end auto-advance
    Advanced,
    /// Queue rebuilt by a play-series or play-recent command
    Rebuilt,
    /// Queue emptied by an explicit clear
    Cleared,
}

/// Queue item details for snapshots and SSE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItemInfo {
    /// Queue item UUID (stable for the item's lifetime in the queue)
    pub item_id: Uuid,
    pub media: MediaDescriptor,
    pub entry: EntryRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling() {
        assert_eq!(EngineKind::Audio.sibling(), EngineKind::Video);
        assert_eq!(EngineKind::Video.sibling(), EngineKind::Audio);
    }

    #[test]
    fn test_transport_is_active() {
        assert!(!TransportState::Idle.is_active());
        assert!(TransportState::Loading.is_active());
        assert!(TransportState::Playing.is_active());
        assert!(TransportState::Paused.is_active());
        assert!(TransportState::Ended.is_active());
        assert!(TransportState::Error.is_active());
    }

    #[test]
    fn test_transport_serde() {
        let json = serde_json::to_string(&TransportState::Loading).unwrap();
        assert_eq!(json, "\"loading\"");
    }
}
