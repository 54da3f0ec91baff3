//! # Tern Common Library
//!
//! Shared code for the Tern media player service:
//! - Domain model (entries, attachments, media descriptors)
//! - Event types (PlayerEvent enum) and EventBus
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
pub use model::{Attachment, Entry, EntryRef, MediaDescriptor, MediaId, MediaKind};
