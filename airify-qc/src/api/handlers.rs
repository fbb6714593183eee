//! HTTP request handlers

use crate::api::server::AppContext;
use crate::catalog::TrackId;
use crate::error::Error;
use crate::queue::{Committed, QueueEntryView, VoteDirection};
use airify_common::events::{AirifyEvent, PlaybackState, QueueChangeTrigger};
use airify_common::time::now;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct PlaylistInfo {
    uri: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    user: String,
    opened_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    playlist: PlaylistInfo,
    session: SessionInfo,
    device: String,
    state: PlaybackState,
    tracks_played: usize,
    queue_length: usize,
    /// Head track while it is on the sink, otherwise null
    current: Option<QueueEntryView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfoResponse {
    version: String,
    git_hash: String,
    build_timestamp: String,
    build_profile: String,
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn error_response(e: &Error) -> ApiError {
    let status = match e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidDirection(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "airify-qc".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Control / Queue Endpoints
// ============================================================================

/// GET /api/control - Playlist identity and current playback pointer
pub async fn get_control(State(ctx): State<AppContext>) -> Json<ControlResponse> {
    let status = ctx.state.status().await;
    let snapshot = ctx.queue.snapshot(status.now_playing.as_ref(), now()).await;
    let queue_length = snapshot.len();

    let current = match &status.now_playing {
        Some(playing) => snapshot.into_iter().next().filter(|head| head.id == playing.track_id),
        None => None,
    };

    Json(ControlResponse {
        playlist: PlaylistInfo {
            uri: ctx.info.playlist_uri.clone(),
            name: ctx.info.playlist_name.clone(),
        },
        session: SessionInfo {
            user: ctx.info.session_user.clone(),
            opened_at: ctx.info.session_opened_at,
        },
        device: ctx.info.device.clone(),
        state: status.state,
        tracks_played: status.tracks_played,
        queue_length,
        current,
    })
}

/// GET /api/queue - Ordered tracks with scores
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<Vec<QueueEntryView>> {
    let now_playing = ctx.state.get_now_playing().await;
    Json(ctx.queue.snapshot(now_playing.as_ref(), now()).await)
}

// ============================================================================
// Vote Endpoint
// ============================================================================

/// POST /api/vote/:track_id/:direction - Vote a track up or down
///
/// Returns `true` when the play order changed.
pub async fn vote(
    State(ctx): State<AppContext>,
    Path((track_id, direction)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    let direction: VoteDirection = direction.parse().map_err(|e: Error| {
        warn!("Rejected vote on {}: {}", track_id, e);
        error_response(&e)
    })?;
    let track_id = TrackId::new(track_id);

    let Committed { change: outcome, order } = ctx.queue.vote(&track_id, direction).await.map_err(|e| {
        debug!("Rejected vote {} on {}: {}", direction, track_id, e);
        error_response(&e)
    })?;

    let moved = outcome.moved();
    info!(
        "Vote {} on {}: score {}, position {} -> {}",
        direction, track_id, outcome.score, outcome.from, outcome.to
    );

    ctx.state.broadcast_event(AirifyEvent::VoteCast {
        track_id: track_id.to_string(),
        direction: direction.to_string(),
        score: outcome.score,
        moved,
        timestamp: now(),
    });
    if moved {
        ctx.state.broadcast_event(AirifyEvent::QueueChanged {
            queue: order.iter().map(ToString::to_string).collect(),
            trigger: QueueChangeTrigger::Vote,
            timestamp: now(),
        });
    }

    Ok(Json(moved))
}

// ============================================================================
// Build Info
// ============================================================================

/// GET /api/build_info - Build identification captured by build.rs
pub async fn get_build_info() -> Json<BuildInfoResponse> {
    Json(BuildInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}
