//! Cross-engine exclusivity tests
//!
//! Verifies that starting playback on one engine always stops the other,
//! through every path that transitions toward Playing.

use tern_common::config::PlayerConfig;
use tern_common::events::TransportState;
use tern_common::model::{EntryRef, MediaDescriptor, MediaId};
use tern_mp::bootstrap::{self, PlayerSet};
use tern_mp::playback::{ResourceEvent, ResourceEventKind};

fn players() -> PlayerSet {
    bootstrap::wire(&PlayerConfig::default())
}

fn audio_media(id: i64) -> MediaDescriptor {
    MediaDescriptor::EnclosureAudio {
        enclosure_id: id,
        url: format!("https://cdn.example.com/{}.mp3", id),
        mime_type: "audio/mpeg".to_string(),
        duration_hint_seconds: None,
    }
}

fn video_media(id: i64) -> MediaDescriptor {
    MediaDescriptor::EnclosureVideo {
        enclosure_id: id,
        url: format!("https://cdn.example.com/{}.mp4", id),
        mime_type: "video/mp4".to_string(),
    }
}

fn entry_ref(id: i64) -> EntryRef {
    EntryRef {
        id,
        feed_id: 1,
        title: format!("Entry {}", id),
    }
}

fn ready(media: MediaId, duration_seconds: f64) -> ResourceEvent {
    ResourceEvent {
        media,
        kind: ResourceEventKind::Ready { duration_seconds },
    }
}

async fn assert_exclusive(set: &PlayerSet) {
    let audio = set.audio.snapshot().await.transport;
    let video = set.video.snapshot().await.transport;
    assert!(
        !(audio == TransportState::Playing && video == TransportState::Playing),
        "both engines playing: audio={}, video={}",
        audio,
        video
    );
}

#[tokio::test]
async fn test_youtube_stops_playing_audio() {
    let set = players();

    set.audio.play(audio_media(1), entry_ref(1)).await.unwrap();
    set.audio
        .handle_resource_event(ready(MediaId::Enclosure(1), 60.0))
        .await;
    assert_eq!(set.audio.snapshot().await.transport, TransportState::Playing);

    set.video
        .play_youtube("dQw4w9WgXcQ".to_string(), entry_ref(2))
        .await
        .unwrap();
    set.video
        .handle_resource_event(ready(MediaId::YouTube("dQw4w9WgXcQ".to_string()), 240.0))
        .await;

    let audio = set.audio.snapshot().await;
    let video = set.video.snapshot().await;
    assert_eq!(audio.transport, TransportState::Idle);
    assert!(audio.current.is_none());
    assert_eq!(video.transport, TransportState::Playing);
    assert_eq!(
        video.current.unwrap().media,
        MediaDescriptor::YouTube {
            video_id: "dQw4w9WgXcQ".to_string()
        }
    );
}

#[tokio::test]
async fn test_audio_stops_playing_video() {
    let set = players();

    set.video.play(video_media(1), entry_ref(1)).await.unwrap();
    set.video
        .handle_resource_event(ready(MediaId::Enclosure(1), 60.0))
        .await;

    set.audio.play(audio_media(2), entry_ref(2)).await.unwrap();

    // Video must be idle before the audio load even begins
    assert_eq!(set.video.snapshot().await.transport, TransportState::Idle);
    assert_eq!(set.audio.snapshot().await.transport, TransportState::Loading);
}

#[tokio::test]
async fn test_audio_queue_survives_cross_engine_stop() {
    let set = players();

    set.audio
        .add_to_queue(audio_media(2), entry_ref(2))
        .await
        .unwrap();
    set.audio.play(audio_media(1), entry_ref(1)).await.unwrap();
    set.audio
        .handle_resource_event(ready(MediaId::Enclosure(1), 60.0))
        .await;

    set.video.play(video_media(3), entry_ref(3)).await.unwrap();

    let audio = set.audio.snapshot().await;
    assert_eq!(audio.transport, TransportState::Idle);
    // The exclusivity stop clears current but never the queue
    assert_eq!(audio.queue.len(), 1);
}

#[tokio::test]
async fn test_paused_sibling_is_also_stopped() {
    let set = players();

    set.video.play(video_media(1), entry_ref(1)).await.unwrap();
    set.video
        .handle_resource_event(ready(MediaId::Enclosure(1), 60.0))
        .await;
    set.video.pause().await;

    // Starting audio clears the paused video session entirely: a paused
    // session is non-idle, so the exclusivity stop applies to it too
    set.audio.play(audio_media(2), entry_ref(2)).await.unwrap();
    let video = set.video.snapshot().await;
    assert_eq!(video.transport, TransportState::Idle);
    assert!(video.current.is_none());

    // The cleared engine has nothing to resume afterwards
    set.video.resume().await;
    assert_eq!(set.video.snapshot().await.transport, TransportState::Idle);
    assert_eq!(set.audio.snapshot().await.transport, TransportState::Loading);
}

#[tokio::test]
async fn test_exclusive_through_command_sequence() {
    let set = players();

    set.audio.play(audio_media(1), entry_ref(1)).await.unwrap();
    assert_exclusive(&set).await;
    set.audio
        .handle_resource_event(ready(MediaId::Enclosure(1), 60.0))
        .await;
    assert_exclusive(&set).await;

    set.video.play(video_media(2), entry_ref(2)).await.unwrap();
    assert_exclusive(&set).await;
    set.video
        .handle_resource_event(ready(MediaId::Enclosure(2), 60.0))
        .await;
    assert_exclusive(&set).await;

    set.audio.play(audio_media(3), entry_ref(3)).await.unwrap();
    assert_exclusive(&set).await;
    set.video
        .play_youtube("dQw4w9WgXcQ".to_string(), entry_ref(4))
        .await
        .unwrap();
    assert_exclusive(&set).await;
    set.video
        .handle_resource_event(ready(MediaId::YouTube("dQw4w9WgXcQ".to_string()), 240.0))
        .await;
    assert_exclusive(&set).await;

    // A ready for the long-superseded audio item changes nothing
    set.audio
        .handle_resource_event(ready(MediaId::Enclosure(3), 60.0))
        .await;
    assert_exclusive(&set).await;
    assert_eq!(set.audio.snapshot().await.transport, TransportState::Idle);
    assert_eq!(set.video.snapshot().await.transport, TransportState::Playing);
}
