//! Surface commands and resource callbacks
//!
//! The engines never touch a media element directly. They publish
//! `BackendCommand`s over the `SurfaceLink` for the render surface that owns
//! the real players (native elements, YouTube embed), and the surface reports
//! back with `ResourceEvent`s routed to the owning engine.

use serde::{Deserialize, Serialize};
use tern_common::events::EngineKind;
use tern_common::model::{MediaDescriptor, MediaId};
use tokio::sync::broadcast;

/// What the render surface should do with a playback resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SurfaceAction {
    /// Create/point the underlying player at this descriptor and start it
    Load { descriptor: MediaDescriptor },
    Pause,
    Resume,
    /// Tear down the underlying player for this item
    Unload,
}

/// A command addressed to the render surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendCommand {
    pub engine: EngineKind,
    pub media: MediaId,
    #[serde(flatten)]
    pub action: SurfaceAction,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Broadcast channel from engines to the render surface
///
/// Lossy: commands for a surface that is not connected are dropped, and the
/// surface resynchronizes from session snapshots when it reconnects.
#[derive(Clone)]
pub struct SurfaceLink {
    tx: broadcast::Sender<BackendCommand>,
}

impl SurfaceLink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BackendCommand> {
        self.tx.subscribe()
    }

    /// Publish a command, ignoring whether a surface is connected
    pub fn send(&self, engine: EngineKind, media: MediaId, action: SurfaceAction) {
        let _ = self.tx.send(BackendCommand {
            engine,
            media,
            action,
            timestamp: chrono::Utc::now(),
        });
    }
}

impl std::fmt::Debug for SurfaceLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceLink")
            .field("receivers", &self.tx.receiver_count())
            .finish()
    }
}

/// Callback from the underlying playback resource
///
/// Carries the identity of the item it belongs to so late callbacks for a
/// superseded request can be recognized and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub media: MediaId,
    #[serde(flatten)]
    pub kind: ResourceEventKind,
}

/// Resource callback payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ResourceEventKind {
    /// Resource initialized and playback began
    Ready { duration_seconds: f64 },
    /// Position tick at the resource's own cadence
    Progress { position_seconds: f64 },
    /// Natural end of the current item
    Ended,
    /// Unrecoverable load or playback failure
    Failed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_link_delivers_commands() {
        let link = SurfaceLink::new(16);
        let mut rx = link.subscribe();

        link.send(
            EngineKind::Audio,
            MediaId::Enclosure(1),
            SurfaceAction::Pause,
        );

        let command = rx.try_recv().unwrap();
        assert_eq!(command.engine, EngineKind::Audio);
        assert_eq!(command.media, MediaId::Enclosure(1));
        assert!(matches!(command.action, SurfaceAction::Pause));
    }

    #[test]
    fn test_send_without_surface_is_lossy() {
        let link = SurfaceLink::new(16);
        // No subscriber connected; must not panic or error
        link.send(
            EngineKind::Video,
            MediaId::YouTube("dQw4w9WgXcQ".to_string()),
            SurfaceAction::Unload,
        );
    }

    #[test]
    fn test_resource_event_deserializes_from_callback_json() {
        let json = r#"{
            "media": { "source": "enclosure", "id": 7 },
            "event": "ready",
            "duration_seconds": 1800.5
        }"#;
        let event: ResourceEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.media, MediaId::Enclosure(7));
        match event.kind {
            ResourceEventKind::Ready { duration_seconds } => {
                assert!((duration_seconds - 1800.5).abs() < f64::EPSILON)
            }
            other => panic!("Wrong event kind: {:?}", other),
        }
    }
}
