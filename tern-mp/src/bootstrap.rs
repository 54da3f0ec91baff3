//! Process wiring
//!
//! Construction order is fixed: event bus and surface link, then the
//! coordinator, then both engines holding the coordinator, and finally the
//! stop-hook registration that closes the loop. The engines never reference
//! each other; only the registered hooks do.

use futures::FutureExt;
use std::sync::Arc;

use tern_common::config::PlayerConfig;
use tern_common::events::EventBus;

use crate::playback::{
    AudioPlaybackEngine, ExclusivityCoordinator, SurfaceLink, VideoPlaybackEngine,
};

/// All long-lived playback handles, passed to whatever owns the HTTP surface
#[derive(Clone)]
pub struct PlayerSet {
    pub audio: Arc<AudioPlaybackEngine>,
    pub video: Arc<VideoPlaybackEngine>,
    pub coordinator: Arc<ExclusivityCoordinator>,
    pub events: EventBus,
    pub surface: SurfaceLink,
}

/// Construct and wire the playback engines
pub fn wire(config: &PlayerConfig) -> PlayerSet {
    let events = EventBus::new(config.event_capacity);
    let surface = SurfaceLink::new(config.event_capacity);
    let coordinator = Arc::new(ExclusivityCoordinator::new());

    let audio = Arc::new(AudioPlaybackEngine::new(
        Arc::clone(&coordinator),
        surface.clone(),
        events.clone(),
        config.recent_limit,
    ));
    let video = Arc::new(VideoPlaybackEngine::new(
        Arc::clone(&coordinator),
        surface.clone(),
        events.clone(),
        config.recent_limit,
    ));

    // Second wiring phase: close the exclusivity loop
    let handle = Arc::clone(&audio);
    coordinator.register_audio_stopper(move || {
        let handle = Arc::clone(&handle);
        async move { handle.stop_if_active().await }.boxed()
    });
    let handle = Arc::clone(&video);
    coordinator.register_video_stopper(move || {
        let handle = Arc::clone(&handle);
        async move { handle.stop_if_active().await }.boxed()
    });

    PlayerSet {
        audio,
        video,
        coordinator,
        events,
        surface,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_registers_both_stoppers() {
        let set = wire(&PlayerConfig::default());
        let debug = format!("{:?}", set.coordinator);
        assert!(debug.contains("audio_registered: true"));
        assert!(debug.contains("video_registered: true"));
    }
}
