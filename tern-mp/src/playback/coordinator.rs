//! Cross-engine exclusivity coordinator
//!
//! Guarantees that starting playback on one engine stops the other, without
//! a compile-time cycle between the engine types: the engines are handed the
//! coordinator at construction, and their stop hooks are registered
//! afterwards in a second wiring phase.
//!
//! The coordinator also owns the command turn: a single mutex every mutating
//! operation (UI command or resource callback) holds for its duration, so a
//! state change and the cross-engine stop it causes are observed atomically.

use futures::future::BoxFuture;
use std::sync::OnceLock;
use tern_common::events::EngineKind;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

type StopFn = Box<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>;

/// Wires the two playback engines' stop operations together
pub struct ExclusivityCoordinator {
    turn: Mutex<()>,
    audio_stop: OnceLock<StopFn>,
    video_stop: OnceLock<StopFn>,
}

impl ExclusivityCoordinator {
    pub fn new() -> Self {
        Self {
            turn: Mutex::new(()),
            audio_stop: OnceLock::new(),
            video_stop: OnceLock::new(),
        }
    }

    /// Acquire the command turn
    ///
    /// Held by every mutating engine operation for its full duration.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Register the audio engine's stop hook (wiring phase, once at startup)
    ///
    /// The hook stops the audio engine if its session is non-idle and
    /// returns whether it actually stopped anything.
    pub fn register_audio_stopper<F>(&self, stopper: F)
    where
        F: Fn() -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        if self.audio_stop.set(Box::new(stopper)).is_err() {
            warn!("Audio stopper already registered; ignoring");
        }
    }

    /// Register the video engine's stop hook (wiring phase, once at startup)
    pub fn register_video_stopper<F>(&self, stopper: F)
    where
        F: Fn() -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        if self.video_stop.set(Box::new(stopper)).is_err() {
            warn!("Video stopper already registered; ignoring");
        }
    }

    /// Stop the sibling of `engine`, called immediately before `engine`
    /// transitions toward Playing
    ///
    /// Returns true if the sibling was active and got stopped. Must be called
    /// with the command turn held and without holding either session lock.
    pub async fn stop_sibling(&self, engine: EngineKind) -> bool {
        let sibling = engine.sibling();
        let slot = match sibling {
            EngineKind::Audio => &self.audio_stop,
            EngineKind::Video => &self.video_stop,
        };

        let Some(stopper) = slot.get() else {
            warn!("No {} stopper registered; wiring incomplete", sibling);
            return false;
        };

        let stopped = stopper().await;
        if stopped {
            debug!("Stopped {} engine before {} playback", sibling, engine);
        }
        stopped
    }
}

impl Default for ExclusivityCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExclusivityCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusivityCoordinator")
            .field("audio_registered", &self.audio_stop.get().is_some())
            .field("video_registered", &self.video_stop.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stop_sibling_invokes_other_engine() {
        let coordinator = ExclusivityCoordinator::new();
        let audio_stops = Arc::new(AtomicUsize::new(0));
        let video_stops = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&audio_stops);
        coordinator.register_audio_stopper(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }
            .boxed()
        });
        let counter = Arc::clone(&video_stops);
        coordinator.register_video_stopper(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }
            .boxed()
        });

        assert!(coordinator.stop_sibling(EngineKind::Audio).await);
        assert_eq!(video_stops.load(Ordering::SeqCst), 1);
        assert_eq!(audio_stops.load(Ordering::SeqCst), 0);

        assert!(coordinator.stop_sibling(EngineKind::Video).await);
        assert_eq!(audio_stops.load(Ordering::SeqCst), 1);
        assert_eq!(video_stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_idle_sibling_reports_not_stopped() {
        let coordinator = ExclusivityCoordinator::new();
        coordinator.register_video_stopper(|| async { false }.boxed());
        assert!(!coordinator.stop_sibling(EngineKind::Audio).await);
    }

    #[tokio::test]
    async fn test_unregistered_stopper_is_harmless() {
        let coordinator = ExclusivityCoordinator::new();
        assert!(!coordinator.stop_sibling(EngineKind::Audio).await);
    }

    #[tokio::test]
    async fn test_second_registration_is_ignored() {
        let coordinator = ExclusivityCoordinator::new();
        coordinator.register_video_stopper(|| async { true }.boxed());
        coordinator.register_video_stopper(|| async { false }.boxed());
        // First registration wins
        assert!(coordinator.stop_sibling(EngineKind::Audio).await);
    }
}
