//! Shared playback state
//!
//! Written by the sequencer, read by the control API. Uses RwLock for
//! concurrent reads with rare writes.

use crate::catalog::TrackId;
use airify_common::events::{AirifyEvent, PlaybackState};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};

/// Track currently on the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub track_id: TrackId,
    /// Wall-clock time the sink was told to play
    pub started_at: DateTime<Utc>,
}

/// Sequencer status as seen by readers
#[derive(Debug, Clone)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub now_playing: Option<NowPlaying>,
    pub tracks_played: usize,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            now_playing: None,
            tracks_played: 0,
        }
    }
}

/// Shared state accessible by all components
pub struct SharedState {
    playback: RwLock<PlaybackStatus>,

    /// Event broadcaster for SSE events
    event_tx: broadcast::Sender<AirifyEvent>,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self {
            playback: RwLock::new(PlaybackStatus::default()),
            event_tx,
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: AirifyEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<AirifyEvent> {
        self.event_tx.subscribe()
    }

    pub async fn status(&self) -> PlaybackStatus {
        self.playback.read().await.clone()
    }

    pub async fn get_playback_state(&self) -> PlaybackState {
        self.playback.read().await.state
    }

    /// Set playback state, returning the previous one
    pub async fn set_playback_state(&self, state: PlaybackState) -> PlaybackState {
        let mut playback = self.playback.write().await;
        std::mem::replace(&mut playback.state, state)
    }

    pub async fn get_now_playing(&self) -> Option<NowPlaying> {
        self.playback.read().await.now_playing.clone()
    }

    pub async fn set_now_playing(&self, now_playing: Option<NowPlaying>) {
        self.playback.write().await.now_playing = now_playing;
    }

    /// Tracks started so far, as counted by the sequencer
    pub async fn set_tracks_played(&self, count: usize) {
        self.playback.write().await.tracks_played = count;
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
