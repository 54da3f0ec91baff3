//! HTTP request handlers
//!
//! Invalid transport transitions are silent no-ops inside the engines, so
//! transport commands always answer 200 with the resulting snapshot; only
//! malformed requests (unplayable entry, wrong media kind) answer 400.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tern_common::model::{Entry, MediaDescriptor, MediaId, MediaKind};

use crate::api::AppState;
use crate::error::Error;
use crate::playback::{ResourceEvent, SessionSnapshot};
use crate::resolver;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub entry: Entry,
}

#[derive(Debug, Deserialize)]
pub struct PlaySeriesRequest {
    pub series_id: i64,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct PlayRecentRequest {
    pub entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct PlayYouTubeRequest {
    pub video_id: String,
    pub entry: Entry,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub playable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub queued: bool,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct PlayCollectionResponse {
    pub taken: usize,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub queue: Vec<tern_common::events::QueueItemInfo>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

type ApiError = (StatusCode, String);

fn api_error(error: Error) -> ApiError {
    match error {
        Error::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        Error::NotFound(message) => (StatusCode::NOT_FOUND, message),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn unplayable(kind: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        format!("Entry has no playable {}", kind),
    )
}

// ============================================================================
// Resolution
// ============================================================================

/// POST /resolve - is this entry playable, and as what kind
pub async fn resolve_entry(Json(request): Json<EntryRequest>) -> Json<ResolveResponse> {
    match resolver::resolve(&request.entry) {
        Some(media) => Json(ResolveResponse {
            playable: true,
            kind: Some(media.kind()),
            media: Some(media),
        }),
        None => Json(ResolveResponse {
            playable: false,
            kind: None,
            media: None,
        }),
    }
}

// ============================================================================
// Audio engine
// ============================================================================

/// POST /audio/play - play the entry's audio enclosure
pub async fn audio_play(
    State(state): State<AppState>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let media = match resolver::resolve(&request.entry) {
        Some(media @ MediaDescriptor::EnclosureAudio { .. }) => media,
        _ => return Err(unplayable("audio")),
    };
    state
        .players
        .audio
        .play(media, request.entry.to_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(state.players.audio.snapshot().await))
}

/// POST /audio/pause
pub async fn audio_pause(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.audio.pause().await;
    Json(state.players.audio.snapshot().await)
}

/// POST /audio/resume
pub async fn audio_resume(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.audio.resume().await;
    Json(state.players.audio.snapshot().await)
}

/// POST /audio/stop
pub async fn audio_stop(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.audio.stop().await;
    Json(state.players.audio.snapshot().await)
}

/// POST /audio/enqueue - append the entry's audio to the queue
pub async fn audio_enqueue(
    State(state): State<AppState>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    let media = match resolver::resolve(&request.entry) {
        Some(media @ MediaDescriptor::EnclosureAudio { .. }) => media,
        _ => return Err(unplayable("audio")),
    };
    let queued = state
        .players
        .audio
        .add_to_queue(media, request.entry.to_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(EnqueueResponse {
        queued,
        session: state.players.audio.snapshot().await,
    }))
}

/// POST /audio/play-series - queue a series and play from the top
pub async fn audio_play_series(
    State(state): State<AppState>,
    Json(request): Json<PlaySeriesRequest>,
) -> Json<PlayCollectionResponse> {
    let taken = state
        .players
        .audio
        .play_series_from_entry(request.series_id, &request.entries)
        .await;
    Json(PlayCollectionResponse {
        taken,
        session: state.players.audio.snapshot().await,
    })
}

/// POST /audio/play-recent - queue the most recent playable audio entries
pub async fn audio_play_recent(
    State(state): State<AppState>,
    Json(request): Json<PlayRecentRequest>,
) -> Json<PlayCollectionResponse> {
    let taken = state.players.audio.play_all_recent(&request.entries).await;
    Json(PlayCollectionResponse {
        taken,
        session: state.players.audio.snapshot().await,
    })
}

/// POST /audio/callback - resource callback from the render surface
pub async fn audio_callback(
    State(state): State<AppState>,
    Json(event): Json<ResourceEvent>,
) -> Json<StatusResponse> {
    debug!("Audio resource callback: {:?}", event);
    state.players.audio.handle_resource_event(event).await;
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// GET /audio/session
pub async fn audio_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.players.audio.snapshot().await)
}

/// GET /audio/queue
pub async fn audio_queue(State(state): State<AppState>) -> Json<QueueResponse> {
    Json(QueueResponse {
        queue: state.players.audio.snapshot().await.queue,
    })
}

/// DELETE /audio/queue/:enclosure_id
pub async fn audio_dequeue(
    State(state): State<AppState>,
    Path(enclosure_id): Path<i64>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let removed = state
        .players
        .audio
        .remove_from_queue(&MediaId::Enclosure(enclosure_id))
        .await;
    if !removed {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Enclosure {} is not queued", enclosure_id),
        ));
    }
    Ok(Json(state.players.audio.snapshot().await))
}

/// POST /audio/queue/clear
pub async fn audio_clear_queue(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.audio.clear_queue().await;
    Json(state.players.audio.snapshot().await)
}

// ============================================================================
// Video engine
// ============================================================================

/// POST /video/play - play the entry's video enclosure
pub async fn video_play(
    State(state): State<AppState>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let media = match resolver::resolve(&request.entry) {
        Some(media @ MediaDescriptor::EnclosureVideo { .. }) => media,
        _ => return Err(unplayable("video")),
    };
    state
        .players
        .video
        .play(media, request.entry.to_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(state.players.video.snapshot().await))
}

/// POST /video/play-youtube - play a YouTube video (single-shot)
pub async fn video_play_youtube(
    State(state): State<AppState>,
    Json(request): Json<PlayYouTubeRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state
        .players
        .video
        .play_youtube(request.video_id, request.entry.to_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(state.players.video.snapshot().await))
}

/// POST /video/pause
pub async fn video_pause(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.video.pause().await;
    Json(state.players.video.snapshot().await)
}

/// POST /video/resume
pub async fn video_resume(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.video.resume().await;
    Json(state.players.video.snapshot().await)
}

/// POST /video/stop
pub async fn video_stop(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.video.stop().await;
    Json(state.players.video.snapshot().await)
}

/// POST /video/enqueue - append the entry's video enclosure to the queue
///
/// YouTube-only entries answer 200 with `queued: false`; a single-shot
/// video that cannot be queued is not an error.
pub async fn video_enqueue(
    State(state): State<AppState>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<EnqueueResponse>, ApiError> {
    let media = match resolver::resolve(&request.entry) {
        Some(media @ MediaDescriptor::EnclosureVideo { .. }) => media,
        Some(media @ MediaDescriptor::YouTube { .. }) => media,
        _ => return Err(unplayable("video")),
    };
    let queued = state
        .players
        .video
        .add_to_queue(media, request.entry.to_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(EnqueueResponse {
        queued,
        session: state.players.video.snapshot().await,
    }))
}

/// POST /video/play-series
pub async fn video_play_series(
    State(state): State<AppState>,
    Json(request): Json<PlaySeriesRequest>,
) -> Json<PlayCollectionResponse> {
    let taken = state
        .players
        .video
        .play_series_from_entry(request.series_id, &request.entries)
        .await;
    Json(PlayCollectionResponse {
        taken,
        session: state.players.video.snapshot().await,
    })
}

/// POST /video/play-recent
pub async fn video_play_recent(
    State(state): State<AppState>,
    Json(request): Json<PlayRecentRequest>,
) -> Json<PlayCollectionResponse> {
    let taken = state.players.video.play_all_recent(&request.entries).await;
    Json(PlayCollectionResponse {
        taken,
        session: state.players.video.snapshot().await,
    })
}

/// POST /video/callback - resource callback from the render surface
pub async fn video_callback(
    State(state): State<AppState>,
    Json(event): Json<ResourceEvent>,
) -> Json<StatusResponse> {
    debug!("Video resource callback: {:?}", event);
    state.players.video.handle_resource_event(event).await;
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// GET /video/session
pub async fn video_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.players.video.snapshot().await)
}

/// GET /video/queue
pub async fn video_queue(State(state): State<AppState>) -> Json<QueueResponse> {
    Json(QueueResponse {
        queue: state.players.video.snapshot().await.queue,
    })
}

/// DELETE /video/queue/:enclosure_id
pub async fn video_dequeue(
    State(state): State<AppState>,
    Path(enclosure_id): Path<i64>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let removed = state
        .players
        .video
        .remove_from_queue(&MediaId::Enclosure(enclosure_id))
        .await;
    if !removed {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Enclosure {} is not queued", enclosure_id),
        ));
    }
    Ok(Json(state.players.video.snapshot().await))
}

/// POST /video/queue/clear
pub async fn video_clear_queue(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.players.video.clear_queue().await;
    Json(state.players.video.snapshot().await)
}
