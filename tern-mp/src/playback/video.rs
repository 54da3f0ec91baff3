//! Video playback engine
//!
//! Owns the single active video slot. Two resource kinds hide behind it: a
//! native media element for enclosure video and an embedded player for
//! YouTube. Which one is live follows from the current descriptor, and
//! `stop` releases whichever is active. Only enclosure video is queueable;
//! YouTube videos are single-shot and always replace the current item.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tern_common::events::{
    EngineKind, EventBus, PlayerEvent, QueueChangeTrigger, TransportState,
};
use tern_common::model::{Entry, EntryRef, MediaDescriptor, MediaId};

use crate::error::{Error, Result};
use crate::playback::coordinator::ExclusivityCoordinator;
use crate::playback::queue::QueueItem;
use crate::playback::resource::{ResourceEvent, ResourceEventKind, SurfaceAction, SurfaceLink};
use crate::playback::session::{PlaybackSession, SessionSnapshot};
use crate::resolver;

const ENGINE: EngineKind = EngineKind::Video;

/// The video (enclosure/YouTube) playback engine
pub struct VideoPlaybackEngine {
    session: RwLock<PlaybackSession>,
    surface: SurfaceLink,
    coordinator: Arc<ExclusivityCoordinator>,
    events: EventBus,
    recent_limit: usize,
}

impl VideoPlaybackEngine {
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

    /// Start playing a video enclosure, replacing any current item
    ///
    /// Same transport semantics as the audio engine: the already-current
    /// descriptor resumes when paused, is a no-op while playing or loading,
    /// and anything else loads from position zero.
    pub async fn play(&self, media: MediaDescriptor, entry: EntryRef) -> Result<()> {
        match media {
            MediaDescriptor::EnclosureVideo { .. } => {}
            ref other => {
                return Err(Error::BadRequest(format!(
                    "Video engine play takes a video enclosure, not {} media",
                    other.kind()
                )))
            }
        }
        self.play_descriptor(media, entry).await;
        Ok(())
    }

    /// Start a YouTube video, always replacing the current item directly
    pub async fn play_youtube(&self, video_id: String, entry: EntryRef) -> Result<()> {
        if video_id.is_empty() {
            return Err(Error::BadRequest("Empty YouTube video id".to_string()));
        }
        self.play_descriptor(MediaDescriptor::YouTube { video_id }, entry)
            .await;
        Ok(())
    }

    /// Pause playback; no-op unless currently playing
    pub async fn pause(&self) {
        let _turn = self.coordinator.begin_turn().await;
        let mut session = self.session.write().await;
        if session.transport() != TransportState::Playing {
            debug!("Video pause ignored in {} state", session.transport());
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
            debug!("Video resume ignored: not paused");
            return;
        }
        self.resume_current().await;
    }

    /// Stop playback and release whichever surface is active
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
            debug!(
                "Releasing video {} for {}",
                Self::surface_kind(&item.media),
                media_id
            );
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

    /// Append an entry's video enclosure to the queue
    ///
    /// YouTube descriptors are not queueable; the attempt is a reported
    /// no-op, as is any duplicate of a queued or current item.
    pub async fn add_to_queue(&self, media: MediaDescriptor, entry: EntryRef) -> Result<bool> {
        match media {
            MediaDescriptor::EnclosureVideo { .. } => {}
            MediaDescriptor::YouTube { ref video_id } => {
                info!("YouTube video {} is single-shot; not queued", video_id);
                return Ok(false);
            }
            ref other => {
                return Err(Error::BadRequest(format!(
                    "Video engine cannot queue {} media",
                    other.kind()
                )))
            }
        }

        let _turn = self.coordinator.begin_turn().await;
        let mut session = self.session.write().await;
        let current = session.current_media_id();
        let item = QueueItem::new(media, entry);
        let media_id = item.media_id();
        let added = session.queue.push_back(item, current.as_ref());
        if added {
            self.emit_queue(&session, QueueChangeTrigger::Enqueued);
        } else {
            debug!("Video enqueue ignored: {} already queued or current", media_id);
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

    /// Queue every video enclosure of one series and play the first
    ///
    /// YouTube-only entries are skipped: without an enclosure there is
    /// nothing queueable. Returns how many items were taken.
    pub async fn play_series_from_entry(&self, series_id: i64, entries: &[Entry]) -> usize {
        let playable = entries
            .iter()
            .filter(|entry| entry.feed_id == series_id)
            .filter_map(Self::video_candidate)
            .collect();
        self.play_collection(playable).await
    }

    /// Queue the most recent video enclosures across all sources and play
    /// the first
    pub async fn play_all_recent(&self, entries: &[Entry]) -> usize {
        let mut candidates: Vec<(&Entry, MediaDescriptor)> = entries
            .iter()
            .filter_map(|entry| {
                Self::video_candidate(entry).map(|(media, _)| (entry, media))
            })
            .collect();
        candidates.sort_by(|a, b| b.0.published_at.cmp(&a.0.published_at));
        candidates.truncate(self.recent_limit);

        let playable = candidates
            .into_iter()
            .map(|(entry, media)| (media, entry.to_ref()))
            .collect();
        self.play_collection(playable).await
    }

    /// Handle a callback from whichever video resource is active
    pub async fn handle_resource_event(&self, event: ResourceEvent) {
        let _turn = self.coordinator.begin_turn().await;

        let next = {
            let mut session = self.session.write().await;
            let current_id = match session.current_media_id() {
                Some(id) if id == event.media => id,
                Some(id) => {
                    debug!(
                        "Discarding stale video callback for {} (current is {})",
                        event.media, id
                    );
                    return;
                }
                None => {
                    debug!("Discarding video callback for {}: nothing current", event.media);
                    return;
                }
            };

            match event.kind {
                ResourceEventKind::Ready { duration_seconds } => {
                    if session.transport() != TransportState::Loading {
                        debug!("Video ready ignored in {} state", session.transport());
                        return;
                    }
                    if duration_seconds > 0.0 {
                        session.set_duration(duration_seconds);
                    }
                    session.set_transport(TransportState::Playing);
                    self.emit_transport(TransportState::Loading, TransportState::Playing);
                    info!("Video playing {}", current_id);
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
                    warn!("Video resource failed for {}: {}", current_id, message);
                    let old = session.transport();
                    session.set_error(message.clone());
                    self.emit_transport(old, TransportState::Error);
                    self.events.emit_lossy(PlayerEvent::PlaybackError {
                        engine: ENGINE,
                        media: current_id,
                        message,
                        timestamp: chrono::Utc::now(),
                    });
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

    /// Shared entry point for enclosure and YouTube starts
    async fn play_descriptor(&self, media: MediaDescriptor, entry: EntryRef) {
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
                    return;
                }
                TransportState::Playing | TransportState::Loading => {
                    debug!("Video play ignored: {} already {}", media_id, transport);
                    return;
                }
                _ => {}
            }
        }

        self.start_item(QueueItem::new(media, entry)).await;
    }

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
            debug!(
                "Releasing video {} for {}",
                Self::surface_kind(&prev.media),
                prev_id
            );
            self.surface
                .send(ENGINE, prev_id.clone(), SurfaceAction::Unload);
            self.events.emit_lossy(PlayerEvent::TrackFinished {
                engine: ENGINE,
                media: prev_id,
                completed: false,
                timestamp: chrono::Utc::now(),
            });
        }

        let media_id = item.media_id();
        let media = item.media.clone();
        let entry = item.entry.clone();

        // A queued descriptor that starts playing is consumed from the queue
        if session.queue.remove(&media_id) {
            self.emit_queue(&session, QueueChangeTrigger::Removed);
        }

        session.begin(item, None);
        self.emit_transport(old, TransportState::Loading);
        self.events.emit_lossy(PlayerEvent::TrackStarted {
            engine: ENGINE,
            media: media_id.clone(),
            entry,
            timestamp: chrono::Utc::now(),
        });
        info!(
            "Video loading {} on {}",
            media_id,
            Self::surface_kind(&media)
        );
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
            info!("Video resumed {}", media_id);
            self.surface.send(ENGINE, media_id, SurfaceAction::Resume);
        }
    }

    /// Which underlying resource a descriptor plays on
    fn surface_kind(media: &MediaDescriptor) -> &'static str {
        match media {
            MediaDescriptor::YouTube { .. } => "embed",
            _ => "element",
        }
    }

    fn video_candidate(entry: &Entry) -> Option<(MediaDescriptor, EntryRef)> {
        match resolver::resolve(entry) {
            Some(media @ MediaDescriptor::EnclosureVideo { .. }) => {
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

impl std::fmt::Debug for VideoPlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlaybackEngine")
            .field("recent_limit", &self.recent_limit)
            .finish()
    }
}
