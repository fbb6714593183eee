//! Track catalog
//!
//! Immutable-after-load mapping from track identifier to track metadata.
//! Membership never changes once built; only each track's `score` mutates,
//! and only while the queue's mutation lock is held.

use crate::error::{Error, Result};
use airify_common::human_time::format_track_duration;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Stable track identifier derived from the source locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Track as supplied by a catalog provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Source locator, unique within a playlist
    pub locator: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    /// Unavailable tracks are dropped at catalog build time
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Catalog entry
#[derive(Debug)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub duration: Duration,
    pub human_duration: String,
    /// Position in the (possibly shuffled) source collection
    pub original_rank: usize,
    score: AtomicI64,
}

impl Track {
    fn from_descriptor(descriptor: TrackDescriptor, original_rank: usize) -> Self {
        Self {
            id: TrackId::new(descriptor.locator),
            human_duration: format_track_duration(descriptor.duration_ms),
            duration: Duration::from_millis(descriptor.duration_ms),
            title: descriptor.title,
            artist: descriptor.artist,
            original_rank,
            score: AtomicI64::new(0),
        }
    }

    /// Current vote tally
    pub fn score(&self) -> i64 {
        self.score.load(Ordering::Acquire)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// Apply a vote delta, returning the new score
    ///
    /// Callers must hold the queue mutation lock so that score and position
    /// change together.
    pub(crate) fn adjust_score(&self, delta: i64) -> i64 {
        self.score.fetch_add(delta, Ordering::AcqRel) + delta
    }
}

/// Mapping from track identifier to track, in insertion order
#[derive(Debug, Default)]
pub struct Catalog {
    tracks: HashMap<TrackId, Track>,
    order: Vec<TrackId>,
}

impl Catalog {
    /// Build a catalog from provider descriptors
    ///
    /// Unavailable tracks are dropped. When `shuffle` is set the remaining
    /// tracks are shuffled before `original_rank` is assigned.
    pub fn build<R: Rng + ?Sized>(
        descriptors: Vec<TrackDescriptor>,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let total = descriptors.len();
        let mut playable: Vec<TrackDescriptor> = descriptors
            .into_iter()
            .filter(|d| {
                if !d.available {
                    debug!("Dropping unavailable track {} ({})", d.locator, d.title);
                }
                d.available
            })
            .collect();

        if shuffle {
            playable.shuffle(rng);
        }

        let mut catalog = Catalog {
            tracks: HashMap::with_capacity(playable.len()),
            order: Vec::with_capacity(playable.len()),
        };

        for (rank, descriptor) in playable.into_iter().enumerate() {
            let track = Track::from_descriptor(descriptor, rank);
            if catalog.tracks.contains_key(&track.id) {
                return Err(Error::DuplicateTrack(track.id.to_string()));
            }
            catalog.order.push(track.id.clone());
            catalog.tracks.insert(track.id.clone(), track);
        }

        info!(
            "Catalog built with {} playable tracks ({} dropped, shuffle={})",
            catalog.len(),
            total - catalog.len(),
            shuffle
        );

        Ok(catalog)
    }

    /// Build without shuffling
    pub fn from_descriptors(descriptors: Vec<TrackDescriptor>) -> Result<Self> {
        Self::build(descriptors, false, &mut rand::thread_rng())
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Track identifiers in insertion order
    pub fn ids(&self) -> &[TrackId] {
        &self.order
    }

    /// Tracks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Score of a track, zero for unknown ids
    pub fn score_of(&self, id: &TrackId) -> i64 {
        self.get(id).map(Track::score).unwrap_or(0)
    }
}
