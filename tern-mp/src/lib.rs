//! # Tern Media Player (tern-mp)
//!
//! Unified media playback coordinator for the Tern feed reader.
//!
//! **Purpose:** Keep the audio (podcast) and video (enclosure/YouTube)
//! playback engines behaving as a single logical "now playing" slot: each
//! engine owns its queue, transport state, and progress, and starting one
//! kind of media always stops the other.
//!
//! **Architecture:** Engines are state machines driven by REST commands and
//! resource callbacks; the render surface that owns the real media elements
//! consumes surface commands and player events over SSE.

pub mod api;
pub mod bootstrap;
pub mod error;
pub mod playback;
pub mod resolver;

pub use bootstrap::{wire, PlayerSet};
pub use error::{Error, Result};
