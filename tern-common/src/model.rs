//! Domain model shared between the media player and its collaborators
//!
//! Entries and attachments are supplied by the data-fetching layer; the
//! player never fetches them itself. Media descriptors are the resolver's
//! typed view of "the one playable thing in this entry".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content entry as delivered by the feed backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Stable entry id assigned by the backend
    pub id: i64,
    /// Owning feed (series/source) id
    pub feed_id: i64,
    pub title: String,
    /// Canonical URL of the entry
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Entry {
    /// Lightweight reference for queue items and events
    pub fn to_ref(&self) -> EntryRef {
        EntryRef {
            id: self.id,
            feed_id: self.feed_id,
            title: self.title.clone(),
        }
    }
}

/// A media attachment (enclosure) on an entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub url: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    /// Duration advertised by the feed, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Reference to the entry a playing item came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
}

/// The resolved, typed representation of a playable resource
///
/// Resolved at most once per entry; immutable; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaDescriptor {
    /// Audio enclosure (podcast episode)
    EnclosureAudio {
        enclosure_id: i64,
        url: String,
        mime_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_hint_seconds: Option<f64>,
    },
    /// Native video enclosure
    EnclosureVideo {
        enclosure_id: i64,
        url: String,
        mime_type: String,
    },
    /// YouTube video referenced by the entry's canonical URL
    #[serde(rename = "youtube")]
    YouTube { video_id: String },
}

impl MediaDescriptor {
    /// Identity used for queue dedup and stale-callback detection
    pub fn media_id(&self) -> MediaId {
        match self {
            MediaDescriptor::EnclosureAudio { enclosure_id, .. }
            | MediaDescriptor::EnclosureVideo { enclosure_id, .. } => {
                MediaId::Enclosure(*enclosure_id)
            }
            MediaDescriptor::YouTube { video_id } => MediaId::YouTube(video_id.clone()),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaDescriptor::EnclosureAudio { .. } => MediaKind::Audio,
            MediaDescriptor::EnclosureVideo { .. } => MediaKind::Video,
            MediaDescriptor::YouTube { .. } => MediaKind::YouTube,
        }
    }
}

/// Descriptor identity: enclosure id or YouTube video id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum MediaId {
    Enclosure(i64),
    #[serde(rename = "youtube")]
    YouTube(String),
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaId::Enclosure(id) => write!(f, "enclosure:{}", id),
            MediaId::YouTube(id) => write!(f, "youtube:{}", id),
        }
    }
}

/// Playable media category, exposed so UI controls can pick an affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    YouTube,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::YouTube => write!(f, "youtube"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_descriptor(id: i64) -> MediaDescriptor {
        MediaDescriptor::EnclosureAudio {
            enclosure_id: id,
            url: format!("https://cdn.example.com/{}.mp3", id),
            mime_type: "audio/mpeg".to_string(),
            duration_hint_seconds: None,
        }
    }

    #[test]
    fn test_media_id_identity() {
        // Same enclosure id, different URLs: same identity
        let a = audio_descriptor(7);
        let b = MediaDescriptor::EnclosureVideo {
            enclosure_id: 7,
            url: "https://cdn.example.com/other.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
        };
        assert_eq!(a.media_id(), b.media_id());

        let yt = MediaDescriptor::YouTube {
            video_id: "dQw4w9WgXcQ".to_string(),
        };
        assert_ne!(a.media_id(), yt.media_id());
        assert_eq!(yt.media_id(), MediaId::YouTube("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_descriptor_serde_tag() {
        let yt = MediaDescriptor::YouTube {
            video_id: "abc123def45".to_string(),
        };
        let json = serde_json::to_value(&yt).unwrap();
        assert_eq!(json["kind"], "youtube");
        assert_eq!(json["video_id"], "abc123def45");
    }

    #[test]
    fn test_entry_ref() {
        let entry = Entry {
            id: 42,
            feed_id: 3,
            title: "Episode 42".to_string(),
            url: "https://example.com/42".to_string(),
            published_at: Utc::now(),
            attachments: vec![],
        };
        let entry_ref = entry.to_ref();
        assert_eq!(entry_ref.id, 42);
        assert_eq!(entry_ref.feed_id, 3);
    }
}
