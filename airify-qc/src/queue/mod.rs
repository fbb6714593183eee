//! Queue engine
//!
//! Owns the mutable play order. `vote` and `advance` serialize behind a
//! single `RwLock`; snapshots take the read side so they never observe a
//! queue mid-swap.

pub mod engine;

pub use engine::{PlayQueue, VoteDirection, VoteOutcome};

use crate::catalog::{Catalog, Track, TrackId};
use crate::error::Result;
use crate::state::NowPlaying;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Track object as exposed by the control API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryView {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Human-readable duration
    pub duration: String,
    pub duration_ms: u64,
    pub score: i64,
    /// Milliseconds left on the head track, only while it is playing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u64>,
}

impl QueueEntryView {
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration: track.human_duration.clone(),
            duration_ms: track.duration_ms(),
            score: track.score(),
            remaining_time: None,
        }
    }
}

/// A mutation together with the play order it left behind
///
/// `order` is captured under the same write lock as the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub change: T,
    pub order: Vec<TrackId>,
}

/// Shared queue engine
///
/// Passed by `Arc` to the sequencer and the control API.
pub struct QueueEngine {
    catalog: Arc<Catalog>,
    queue: RwLock<PlayQueue>,
}

impl QueueEngine {
    /// Build the queue from the catalog's (possibly shuffled) order
    pub fn initialize(catalog: Arc<Catalog>) -> Self {
        let queue = PlayQueue::initialize(&catalog);
        Self {
            catalog,
            queue: RwLock::new(queue),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Apply a vote under the mutation lock
    pub async fn vote(&self, track_id: &TrackId, direction: VoteDirection) -> Result<Committed<VoteOutcome>> {
        let mut queue = self.queue.write().await;
        let change = queue.vote(&self.catalog, track_id, direction)?;
        Ok(Committed {
            change,
            order: queue.ids().to_vec(),
        })
    }

    /// Remove the head under the mutation lock
    pub async fn advance(&self) -> Option<Committed<TrackId>> {
        let mut queue = self.queue.write().await;
        let change = queue.advance()?;
        Some(Committed {
            change,
            order: queue.ids().to_vec(),
        })
    }

    pub async fn peek_head(&self) -> Option<TrackId> {
        self.queue.read().await.peek_head().cloned()
    }

    pub async fn len(&self) -> usize {
        self.queue.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.read().await.is_empty()
    }

    /// Track identifiers in play order
    pub async fn order(&self) -> Vec<TrackId> {
        self.queue.read().await.ids().to_vec()
    }

    /// Consistent projection of the queue
    ///
    /// The head carries `remaining_time` when it is the track the sequencer
    /// reports as playing.
    pub async fn snapshot(&self, now_playing: Option<&NowPlaying>, now: DateTime<Utc>) -> Vec<QueueEntryView> {
        let queue = self.queue.read().await;

        let mut views: Vec<QueueEntryView> = queue
            .ids()
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .map(QueueEntryView::from_track)
            .collect();

        if let (Some(head), Some(playing)) = (views.first_mut(), now_playing) {
            if head.id == playing.track_id {
                head.remaining_time = Some(airify_common::time::remaining_ms(
                    head.duration_ms,
                    playing.started_at,
                    now,
                ));
            }
        }

        views
    }

    /// View of a single queued track
    pub async fn entry(&self, track_id: &TrackId) -> Option<QueueEntryView> {
        let queue = self.queue.read().await;
        if !queue.contains(track_id) {
            return None;
        }
        self.catalog.get(track_id).map(QueueEntryView::from_track)
    }
}
