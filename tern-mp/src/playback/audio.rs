//! Audio playback engine
//!
//! Owns the single active audio slot: current item, transport state, queue,
//! and progress. Every mutating operation runs under the coordinator's
//! command turn, and any transition toward Playing first stops the video
//! engine through the coordinator.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tern_common::events::{
    EngineKind, EventBus, PlayerEvent, QueueChangeTrigger, TransportState,
};
use tern_common::model::{Entry, EntryRef, MediaDescriptor, MediaId, MediaKind};

use crate::error::{Error, Result};
use crate::playback::coordinator::ExclusivityCoordinator;
use crate::playback::queue::QueueItem;
use crate::playback::resource::{ResourceEvent, ResourceEventKind, SurfaceAction, SurfaceLink};
use crate::playback::session::{PlaybackSession, SessionSnapshot};
use crate::resolver;

const ENGINE: EngineKind = EngineKind::Audio;

/// The audio (podcast) playback engine
pub struct AudioPlaybackEngine {
    session: RwLock<PlaybackSession>,
    surface: SurfaceLink,
    coordinator: Arc<ExclusivityCoordinator>,
    events: EventBus,
    recent_limit: usize,
}

impl AudioPlaybackEngine {
    pub fn new(
        coordinator: Arc<ExclusivityCoordinator>,
        surface: SurfaceLink,
        events: EventBus,
        recent_limit: usize,
    ) -> Self {
        Self {
            session: RwLock::new(PlaybackSession::new()),
            surface,
            coordinator,
            events,
            recent_limit,
        }
    }

    /// Start playing an audio descriptor, replacing any current item
    ///
    /// Playing the descriptor that is already current while paused is
    /// equivalent to `resume` (no position reset); while playing or loading
    /// it is a no-op. Any other descriptor always loads from position zero.
    pub async fn play(&self, media: MediaDescriptor, entry: EntryRef) -> Result<()> {
        Self::require_audio(&media)?;
        let _turn = self.coordinator.begin_turn().await;

        let media_id = media.media_id();
        let same_current = {
            let session = self.session.read().await;
            (session.current_media_id() == Some(media_id.clone())).then(|| session.transport())
        };
        if let Some(transport) = same_current {
            match transport {
                TransportState::Paused => {
                    self.resume_current().await;
                    return Ok(());
                }
                TransportState::Playing | TransportState::Loading => {
                    debug!("Audio play ignored: {} already {}", media_id, transport);
                    return Ok(());
                }
                // Ended or Error: reload the same item from the start
                _ => {}
            }
        }

        self.start_item(QueueItem::new(media, entry)).await;
        Ok(())
    }

    /// Pause playback; no-op unless currently playing
    pub async fn pause(&self) {
        let _turn = self.coordinator.begin_turn().await;
        let mut session = self.session.write().await;
        if session.transport() != TransportState::Playing {
            debug!("Audio pause ignored in {} state", session.transport());
            return;
        }
        session.set_transport(TransportState::Paused);
        self.emit_transport(TransportState::Playing, TransportState::Paused);
        if let Some(media_id) = session.current_media_id() {
            self.surface.send(ENGINE, media_id, SurfaceAction::Pause);
        }
    }

    /// Resume playback; no-op unless currently paused
    pub async fn resume(&self) {
        let _turn = self.coordinator.begin_turn().await;
        if self.session.read().await.transport() != TransportState::Paused {
            debug!("Audio resume ignored: not paused");
            return;
        }
        self.resume_current().await;
    }

    /// Stop playback, clear the current item, return to Idle
    ///
    /// Callable from any state. The queue survives.
    pub async fn stop(&self) {
        let _turn = self.coordinator.begin_turn().await;
        self.stop_if_active().await;
    }

    /// Stop hook used by the exclusivity coordinator
    ///
    /// Caller holds the command turn. Returns true if the session was active.
    pub async fn stop_if_active(&self) -> bool {
        let mut session = self.session.write().await;
        let old = session.transport();
        if !old.is_active() {
            return false;
        }
        if let Some(item) = session.clear_current() {
            let media_id = item.media_id();
            self.surface
                .send(ENGINE, media_id.clone(), SurfaceAction::Unload);
            self.events.emit_lossy(PlayerEvent::TrackFinished {
                engine: ENGINE,
                media: media_id,
                completed: false,
                timestamp: chrono::Utc::now(),
            });
        }
        self.emit_transport(old, TransportState::Idle);
        true
    }

    /// Append an entry's audio to the queue
    ///
    /// Returns true if the item was added; duplicates of queued items or of
    /// the current item are reported no-ops.
    pub async fn add_to_queue(&self, media: MediaDescriptor, entry: EntryRef) -> Result<bool> {
        Self::require_audio(&media)?;
        let _turn = self.coordinator.begin_turn().await;
        let mut session = self.session.write().await;

        let current = session.current_media_id();
        let item = QueueItem::new(media, entry);
        let media_id = item.media_id();
        let added = session.queue.push_back(item, current.as_ref());
        if added {
            self.emit_queue(&session, QueueChangeTrigger::Enqueued);
        } else {
            debug!("Audio enqueue ignored: {} already queued or current", media_id);
        }
        Ok(added)
    }

    /// Remove a queued item by descriptor identity; no-op if absent
    pub async fn remove_from_queue(&self, media_id: &MediaId) -> bool {
        let _turn = self.coordinator.begin_turn().await;
        let mut session = self.session.write().await;
        let removed = session.queue.remove(media_id);
        if removed {
            self.emit_queue(&session, QueueChangeTrigger::Removed);
        }
        removed
    }

    /// Empty the queue without touching the current item
    pub async fn clear_queue(&self) {
        let _turn = self.coordinator.begin_turn().await;
        let mut session = self.session.write().await;
        if !session.queue.is_empty() {
            session.queue.clear();
            self.emit_queue(&session, QueueChangeTrigger::Cleared);
        }
    }

    /// Queue every playable audio entry of one series and play the first
    ///
    /// Entries keep their given order. Returns how many items were taken
    /// (current plus queued); zero means the series had nothing playable.
    pub async fn play_series_from_entry(&self, series_id: i64, entries: &[Entry]) -> usize {
        let playable = entries
            .iter()
            .filter(|entry| entry.feed_id == series_id)
            .filter_map(Self::audio_candidate)
            .collect();
        self.play_collection(playable).await
    }

    /// Queue the most recent playable audio entries across all sources and
    /// play the first
    pub async fn play_all_recent(&self, entries: &[Entry]) -> usize {
        let mut candidates: Vec<&Entry> = entries
            .iter()
            .filter(|entry| resolver::playable_kind(entry) == Some(MediaKind::Audio))
            .collect();
        candidates.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        candidates.truncate(self.recent_limit);

        let playable = candidates
            .into_iter()
            .filter_map(Self::audio_candidate)
            .collect();
        self.play_collection(playable).await
    }

    /// Handle a callback from the underlying audio resource
    ///
    /// Callbacks whose media identity does not match the current item belong
    /// to a superseded request and are discarded.
    pub async fn handle_resource_event(&self, event: ResourceEvent) {
        let _turn = self.coordinator.begin_turn().await;

        let next = {
            let mut session = self.session.write().await;
            let current_id = match session.current_media_id() {
                Some(id) if id == event.media => id,
                Some(id) => {
                    debug!(
                        "Discarding stale audio callback for {} (current is {})",
                        event.media, id
                    );
                    return;
                }
                None => {
                    debug!("Discarding audio callback for {}: nothing current", event.media);
                    return;
                }
            };

            match event.kind {
                ResourceEventKind::Ready { duration_seconds } => {
                    if session.transport() != TransportState::Loading {
                        debug!("Audio ready ignored in {} state", session.transport());
                        return;
                    }
                    if duration_seconds > 0.0 {
                        session.set_duration(duration_seconds);
                    }
                    session.set_transport(TransportState::Playing);
                    self.emit_transport(TransportState::Loading, TransportState::Playing);
                    info!("Audio playing {}", current_id);
                    None
                }
                ResourceEventKind::Progress { position_seconds } => {
                    if !matches!(
                        session.transport(),
                        TransportState::Playing | TransportState::Paused
                    ) {
                        return;
                    }
                    let clamped = session.set_position(position_seconds);
                    self.events.emit_lossy(PlayerEvent::PlaybackProgress {
                        engine: ENGINE,
                        media: current_id,
                        position_seconds: clamped,
                        duration_seconds: session.duration_seconds(),
                        timestamp: chrono::Utc::now(),
                    });
                    None
                }
                ResourceEventKind::Ended => {
                    let old = session.transport();
                    self.surface
                        .send(ENGINE, current_id.clone(), SurfaceAction::Unload);
                    self.events.emit_lossy(PlayerEvent::TrackFinished {
                        engine: ENGINE,
                        media: current_id,
                        completed: true,
                        timestamp: chrono::Utc::now(),
                    });
                    session.set_transport(TransportState::Ended);
                    self.emit_transport(old, TransportState::Ended);

                    let next = session.queue.advance();
                    session.clear_current();
                    self.emit_transport(TransportState::Ended, TransportState::Idle);
                    if next.is_some() {
                        self.emit_queue(&session, QueueChangeTrigger::Advanced);
                    }
                    next
                }
                ResourceEventKind::Failed { message } => {
                    warn!("Audio resource failed for {}: {}", current_id, message);
                    let old = session.transport();
                    session.set_error(message.clone());
                    self.emit_transport(old, TransportState::Error);
                    self.events.emit_lossy(PlayerEvent::PlaybackError {
                        engine: ENGINE,
                        media: current_id,
                        message,
                        timestamp: chrono::Utc::now(),
                    });
                    // The queue is left untouched: no auto-advance on failure
                    None
                }
            }
        };

        if let Some(item) = next {
            self.start_item(item).await;
        }
    }

    /// Read-only session view
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.read().await.snapshot(ENGINE)
    }

    /// Queue membership test for UI controls
    pub async fn is_queued(&self, media_id: &MediaId) -> bool {
        self.session.read().await.queue.contains(media_id)
    }

    // ------------------------------------------------------------------
    // Internals (command turn held by caller)
    // ------------------------------------------------------------------

    /// Replace the queue with `items` and play the first
    async fn play_collection(&self, items: Vec<(MediaDescriptor, EntryRef)>) -> usize {
        let _turn = self.coordinator.begin_turn().await;

        let mut iter = items.into_iter();
        let first = match iter.next() {
            Some((media, entry)) => QueueItem::new(media, entry),
            None => return 0,
        };
        let first_id = first.media_id();

        let queued = {
            let mut session = self.session.write().await;
            session.queue.clear();
            for (media, entry) in iter {
                session
                    .queue
                    .push_back(QueueItem::new(media, entry), Some(&first_id));
            }
            self.emit_queue(&session, QueueChangeTrigger::Rebuilt);
            session.queue.len()
        };

        self.start_item(first).await;
        queued + 1
    }

    /// Stop the sibling engine, then install and load a new current item
    async fn start_item(&self, item: QueueItem) {
        self.coordinator.stop_sibling(ENGINE).await;

        let mut session = self.session.write().await;
        let old = session.transport();
        if let Some(prev) = session.clear_current() {
            let prev_id = prev.media_id();
            self.surface
                .send(ENGINE, prev_id.clone(), SurfaceAction::Unload);
            self.events.emit_lossy(PlayerEvent::TrackFinished {
                engine: ENGINE,
                media: prev_id,
                completed: false,
                timestamp: chrono::Utc::now(),
            });
        }

        let duration_hint = match &item.media {
            MediaDescriptor::EnclosureAudio {
                duration_hint_seconds,
                ..
            } => *duration_hint_seconds,
            _ => None,
        };
        let media_id = item.media_id();
        let media = item.media.clone();
        let entry = item.entry.clone();

        // A queued descriptor that starts playing is consumed from the queue
        if session.queue.remove(&media_id) {
            self.emit_queue(&session, QueueChangeTrigger::Removed);
        }

        session.begin(item, duration_hint);
        self.emit_transport(old, TransportState::Loading);
        self.events.emit_lossy(PlayerEvent::TrackStarted {
            engine: ENGINE,
            media: media_id.clone(),
            entry,
            timestamp: chrono::Utc::now(),
        });
        info!("Audio loading {}", media_id);
        self.surface
            .send(ENGINE, media_id, SurfaceAction::Load { descriptor: media });
    }

    /// Paused → Playing, stopping the sibling first
    async fn resume_current(&self) {
        self.coordinator.stop_sibling(ENGINE).await;

        let mut session = self.session.write().await;
        if session.transport() != TransportState::Paused {
            return;
        }
        session.set_transport(TransportState::Playing);
        self.emit_transport(TransportState::Paused, TransportState::Playing);
        if let Some(media_id) = session.current_media_id() {
            info!("Audio resumed {}", media_id);
            self.surface.send(ENGINE, media_id, SurfaceAction::Resume);
        }
    }

    fn require_audio(media: &MediaDescriptor) -> Result<()> {
        match media {
            MediaDescriptor::EnclosureAudio { .. } => Ok(()),
            other => Err(Error::BadRequest(format!(
                "Audio engine cannot play {} media",
                other.kind()
            ))),
        }
    }

    fn audio_candidate(entry: &Entry) -> Option<(MediaDescriptor, EntryRef)> {
        match resolver::resolve(entry) {
            Some(media @ MediaDescriptor::EnclosureAudio { .. }) => {
                Some((media, entry.to_ref()))
            }
            _ => None,
        }
    }

    fn emit_transport(&self, old: TransportState, new: TransportState) {
        if old != new {
            self.events.emit_lossy(PlayerEvent::TransportChanged {
                engine: ENGINE,
                old_state: old,
                new_state: new,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    fn emit_queue(&self, session: &PlaybackSession, trigger: QueueChangeTrigger) {
        self.events.emit_lossy(PlayerEvent::QueueChanged {
            engine: ENGINE,
            trigger,
            queue: session.queue.infos(),
            timestamp: chrono::Utc::now(),
        });
    }
}

impl std::fmt::Debug for AudioPlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPlaybackEngine")
            .field("recent_limit", &self.recent_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_common::events::EventBus;

    fn test_engine() -> AudioPlaybackEngine {
        AudioPlaybackEngine::new(
            Arc::new(ExclusivityCoordinator::new()),
            SurfaceLink::new(16),
            EventBus::new(64),
            50,
        )
    }

    fn audio_media(id: i64) -> MediaDescriptor {
        MediaDescriptor::EnclosureAudio {
            enclosure_id: id,
            url: format!("https://cdn.example.com/{}.mp3", id),
            mime_type: "audio/mpeg".to_string(),
            duration_hint_seconds: None,
        }
    }

    fn entry_ref(id: i64) -> EntryRef {
        EntryRef {
            id,
            feed_id: 1,
            title: format!("Entry {}", id),
        }
    }

    #[tokio::test]
    async fn test_pause_while_idle_is_noop() {
        let engine = test_engine();
        engine.pause().await;
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.transport, TransportState::Idle);
        assert!(snapshot.current.is_none());
    }

    #[tokio::test]
    async fn test_resume_while_idle_is_noop() {
        let engine = test_engine();
        engine.resume().await;
        assert_eq!(engine.snapshot().await.transport, TransportState::Idle);
    }

    #[tokio::test]
    async fn test_play_rejects_non_audio_descriptor() {
        let engine = test_engine();
        let media = MediaDescriptor::YouTube {
            video_id: "dQw4w9WgXcQ".to_string(),
        };
        assert!(engine.play(media, entry_ref(1)).await.is_err());
        assert_eq!(engine.snapshot().await.transport, TransportState::Idle);
    }

    #[tokio::test]
    async fn test_enqueue_deduplicates() {
        let engine = test_engine();
        assert!(engine
            .add_to_queue(audio_media(1), entry_ref(1))
            .await
            .unwrap());
        assert!(!engine
            .add_to_queue(audio_media(1), entry_ref(1))
            .await
            .unwrap());
        assert_eq!(engine.snapshot().await.queue.len(), 1);
        assert!(engine.is_queued(&MediaId::Enclosure(1)).await);
    }

    #[tokio::test]
    async fn test_enqueue_current_is_noop() {
        let engine = test_engine();
        engine.play(audio_media(1), entry_ref(1)).await.unwrap();
        let added = engine
            .add_to_queue(audio_media(1), entry_ref(1))
            .await
            .unwrap();
        assert!(!added);
        assert!(engine.snapshot().await.queue.is_empty());
    }

    #[tokio::test]
    async fn test_stop_keeps_queue() {
        let engine = test_engine();
        engine.play(audio_media(1), entry_ref(1)).await.unwrap();
        engine
            .add_to_queue(audio_media(2), entry_ref(2))
            .await
            .unwrap();

        engine.stop().await;
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.transport, TransportState::Idle);
        assert!(snapshot.current.is_none());
        assert_eq!(snapshot.queue.len(), 1);
    }
}
