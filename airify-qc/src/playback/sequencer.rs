//! Playback sequencer
//!
//! State machine driving the sink from the head of the queue:
//!
//! ```text
//! Idle -> Loading -> Playing -(TrackEnded)-> Loading -> Playing ... -> Finished
//! ```
//!
//! `Finished` is terminal. Sink load/play failures and device loss are
//! fatal and returned to the caller; nothing is retried here.

use super::sink::{PlaybackSink, SinkEvent};
use crate::error::{Error, Result};
use crate::queue::{Committed, QueueEngine};
use crate::state::{NowPlaying, SharedState};
use airify_common::events::{AirifyEvent, PlaybackState, QueueChangeTrigger};
use airify_common::time::now;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub tracks_played: usize,
}

pub struct Sequencer<S: PlaybackSink + ?Sized> {
    queue: Arc<QueueEngine>,
    sink: Arc<S>,
    state: Arc<SharedState>,
    volume: Option<u8>,
    current: PlaybackState,
    tracks_played: usize,
}

impl<S: PlaybackSink + ?Sized> Sequencer<S> {
    pub fn new(queue: Arc<QueueEngine>, sink: Arc<S>, state: Arc<SharedState>) -> Self {
        Self {
            queue,
            sink,
            state,
            volume: None,
            current: PlaybackState::Idle,
            tracks_played: 0,
        }
    }

    /// Volume applied to the sink before the first track
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.current
    }

    pub fn tracks_played(&self) -> usize {
        self.tracks_played
    }

    /// Play whatever is at the head, or finish if the queue is empty
    ///
    /// Assumes the completed track was already removed by [`Self::on_track_end`].
    pub async fn next(&mut self) -> Result<PlaybackState> {
        if self.current.is_terminal() {
            return Ok(self.current);
        }

        self.sink.stop().await?;

        let Some(track_id) = self.queue.peek_head().await else {
            self.state.set_now_playing(None).await;
            self.transition(PlaybackState::Finished).await;
            info!("Finished playing.");
            self.state.broadcast_event(AirifyEvent::PlaybackFinished {
                tracks_played: self.tracks_played,
                timestamp: now(),
            });
            return Ok(self.current);
        };

        let catalog = Arc::clone(self.queue.catalog());
        let track = catalog
            .get(&track_id)
            .ok_or_else(|| Error::Internal(format!("head track {} missing from catalog", track_id)))?;

        self.transition(PlaybackState::Loading).await;
        self.sink.load(track).await?;
        self.sink.play().await?;

        let started_at = now();
        self.state
            .set_now_playing(Some(NowPlaying {
                track_id: track_id.clone(),
                started_at,
            }))
            .await;
        self.tracks_played += 1;
        self.state.set_tracks_played(self.tracks_played).await;
        self.transition(PlaybackState::Playing).await;

        info!(
            "Playing \"{}\" by \"{}\" ({}).",
            track.title, track.artist, track.human_duration
        );
        self.state.broadcast_event(AirifyEvent::TrackStarted {
            track_id: track_id.to_string(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration_ms: track.duration_ms(),
            timestamp: started_at,
        });

        Ok(self.current)
    }

    /// Completion signal from the sink: drop the head, then move on
    pub async fn on_track_end(&mut self) -> Result<PlaybackState> {
        if self.current != PlaybackState::Playing {
            warn!("Ignoring track end while {}", self.current);
            return Ok(self.current);
        }

        if let Some(Committed { change: completed, order }) = self.queue.advance().await {
            self.state.broadcast_event(AirifyEvent::TrackCompleted {
                track_id: completed.to_string(),
                timestamp: now(),
            });
            self.state.broadcast_event(AirifyEvent::QueueChanged {
                queue: order.iter().map(ToString::to_string).collect(),
                trigger: QueueChangeTrigger::Advance,
                timestamp: now(),
            });
        }

        self.next().await
    }

    /// React to a single sink event
    pub async fn handle_event(&mut self, event: SinkEvent) -> Result<PlaybackState> {
        match event {
            SinkEvent::TrackEnded => self.on_track_end().await,
            SinkEvent::DeviceLost(reason) => {
                error!("Another controller took over the device: {}", reason);
                Err(Error::Sink(format!("device lost: {}", reason)))
            }
            SinkEvent::Error(reason) => {
                error!("Device error: {}", reason);
                Err(Error::Sink(reason))
            }
        }
    }

    /// Apply volume and play the first head track
    pub async fn start(&mut self) -> Result<PlaybackState> {
        if let Some(volume) = self.volume {
            self.sink.set_volume(volume).await?;
        }
        self.next().await
    }

    /// Event loop: start, then consume one sink event at a time until Finished
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SinkEvent>) -> Result<RunSummary> {
        self.start().await?;

        while !self.current.is_terminal() {
            let Some(event) = events.recv().await else {
                return Err(Error::Sink("sink event channel closed".to_string()));
            };
            self.handle_event(event).await?;
        }

        Ok(RunSummary {
            tracks_played: self.tracks_played,
        })
    }

    async fn transition(&mut self, new_state: PlaybackState) {
        if self.current == new_state {
            return;
        }
        let old_state = self.state.set_playback_state(new_state).await;
        self.current = new_state;
        self.state.broadcast_event(AirifyEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: now(),
        });
    }
}
