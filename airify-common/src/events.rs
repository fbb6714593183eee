//! Event types for the Airify event system
//!
//! Events are broadcast by the queue controller and serialized for SSE
//! transmission to connected clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playback sequencer state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No track loaded yet
    Idle,
    /// Sink instructed to load the head track
    Loading,
    /// Sink instructed to play the head track
    Playing,
    /// Queue drained, session closed (terminal)
    Finished,
}

impl PlaybackState {
    /// Whether no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Finished)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Finished => write!(f, "finished"),
        }
    }
}

/// What caused the play order to change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueChangeTrigger {
    /// A vote repositioned a track
    Vote,
    /// The head track completed and was removed
    Advance,
}

/// Airify event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AirifyEvent {
    /// Sequencer state changed
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// Head track was loaded and started on the sink
    TrackStarted {
        track_id: String,
        title: String,
        artist: String,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Sink reported the end of the head track
    TrackCompleted {
        track_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Play order changed
    QueueChanged {
        /// Track identifiers in play order after the change
        queue: Vec<String>,
        trigger: QueueChangeTrigger,
        timestamp: DateTime<Utc>,
    },

    /// A vote was applied to a queued track
    VoteCast {
        track_id: String,
        /// "up" or "down"
        direction: String,
        score: i64,
        moved: bool,
        timestamp: DateTime<Utc>,
    },

    /// The queue was exhausted and the session torn down
    PlaybackFinished {
        tracks_played: usize,
        timestamp: DateTime<Utc>,
    },
}

impl AirifyEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            AirifyEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            AirifyEvent::TrackStarted { .. } => "TrackStarted",
            AirifyEvent::TrackCompleted { .. } => "TrackCompleted",
            AirifyEvent::QueueChanged { .. } => "QueueChanged",
            AirifyEvent::VoteCast { .. } => "VoteCast",
            AirifyEvent::PlaybackFinished { .. } => "PlaybackFinished",
        }
    }
}
