//! Playback coordination core
//!
//! **Module structure:**
//! - `session.rs`: per-engine playback session state and snapshots
//! - `queue.rs`: the pending-playback queue shared in behavior by both engines
//! - `resource.rs`: surface commands out, resource callbacks in
//! - `coordinator.rs`: cross-engine exclusivity and the command turn
//! - `audio.rs` / `video.rs`: the two playback engines

pub mod audio;
pub mod coordinator;
pub mod queue;
pub mod resource;
pub mod session;
pub mod video;

pub use audio::AudioPlaybackEngine;
pub use coordinator::ExclusivityCoordinator;
pub use queue::{PlayQueue, QueueItem};
pub use resource::{BackendCommand, ResourceEvent, ResourceEventKind, SurfaceAction, SurfaceLink};
pub use session::{PlaybackSession, SessionSnapshot};
pub use video::VideoPlaybackEngine;
