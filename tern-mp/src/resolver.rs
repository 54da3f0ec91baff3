//! Media resource resolution
//!
//! Pure classification of a content entry into at most one playable media
//! descriptor. An audio enclosure wins over a video enclosure, and either
//! enclosure wins over a YouTube link in the entry's canonical URL, so a
//! podcast episode that happens to link a video still plays as audio.

use tern_common::model::{Entry, MediaDescriptor, MediaKind};
use url::Url;

/// Resolve an entry to its playable media descriptor, if any
pub fn resolve(entry: &Entry) -> Option<MediaDescriptor> {
    if let Some(attachment) = first_attachment_with_prefix(entry, "audio/") {
        return Some(MediaDescriptor::EnclosureAudio {
            enclosure_id: attachment.id,
            url: attachment.url.clone(),
            mime_type: attachment.mime_type.clone(),
            duration_hint_seconds: attachment.duration_seconds,
        });
    }

    if let Some(attachment) = first_attachment_with_prefix(entry, "video/") {
        return Some(MediaDescriptor::EnclosureVideo {
            enclosure_id: attachment.id,
            url: attachment.url.clone(),
            mime_type: attachment.mime_type.clone(),
        });
    }

    youtube_video_id(&entry.url).map(|video_id| MediaDescriptor::YouTube { video_id })
}

/// Playability affordance for UI controls: is this entry playable, and as what
pub fn playable_kind(entry: &Entry) -> Option<MediaKind> {
    resolve(entry).map(|descriptor| descriptor.kind())
}

fn first_attachment_with_prefix<'a>(
    entry: &'a Entry,
    prefix: &str,
) -> Option<&'a tern_common::model::Attachment> {
    entry
        .attachments
        .iter()
        .find(|a| a.mime_type.starts_with(prefix))
}

/// Extract a YouTube video id from a watch/shorts/live/embed/short-link URL
///
/// Malformed URLs and URLs with no extractable id yield None, never an error.
pub fn youtube_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.strip_prefix("www.").unwrap_or(url.host_str()?);

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = url.path_segments()?;
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                "shorts" | "live" | "embed" => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    if is_video_id(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Video ids are 11 characters from the URL-safe base64 alphabet
fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
