//! Play order and vote-driven repositioning
//!
//! `PlayQueue` is the plain data structure; it performs no locking and is
//! wrapped by [`super::QueueEngine`] for shared use.
//!
//! Invariants:
//! - every catalog track appears at most once, and nothing else appears
//! - index 0 (the head) is never moved by a vote

use crate::catalog::{Catalog, TrackId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Score change applied by this vote
    pub fn delta(&self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

impl std::str::FromStr for VoteDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            _ => Err(Error::InvalidDirection(s.to_string())),
        }
    }
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub track_id: TrackId,
    pub direction: VoteDirection,
    /// Score after the vote
    pub score: i64,
    /// Index before the vote
    pub from: usize,
    /// Index after the vote
    pub to: usize,
}

impl VoteOutcome {
    /// Whether any swap occurred
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Ordered sequence of track identifiers
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    order: Vec<TrackId>,
}

impl PlayQueue {
    /// Build the queue in catalog insertion order
    pub fn initialize(catalog: &Catalog) -> Self {
        Self {
            order: catalog.ids().to_vec(),
        }
    }

    /// Apply a vote and reposition the track
    ///
    /// The score always changes. The position changes only if the track is
    /// not the head: it is swapped one slot at a time toward the front (Up)
    /// while the neighbour scores strictly lower, or toward the back (Down)
    /// while the neighbour scores the same or higher. Index 0 is never a
    /// swap target.
    pub fn vote(
        &mut self,
        catalog: &Catalog,
        track_id: &TrackId,
        direction: VoteDirection,
    ) -> Result<VoteOutcome> {
        let from = self
            .position(track_id)
            .ok_or_else(|| Error::NotFound(track_id.clone()))?;
        let track = catalog
            .get(track_id)
            .ok_or_else(|| Error::Internal(format!("queued track {} missing from catalog", track_id)))?;

        let score = track.adjust_score(direction.delta());

        if from == 0 {
            debug!("Vote {} on head track {}: score {} (position fixed)", direction, track_id, score);
            return Ok(VoteOutcome {
                track_id: track_id.clone(),
                direction,
                score,
                from,
                to: from,
            });
        }

        let to = self.reposition(catalog, from, direction, score);
        debug!(
            "Vote {} on {}: score {}, position {} -> {}",
            direction, track_id, score, from, to
        );

        Ok(VoteOutcome {
            track_id: track_id.clone(),
            direction,
            score,
            from,
            to,
        })
    }

    /// Swap the element at `i` outward until the ordering condition fails
    fn reposition(&mut self, catalog: &Catalog, mut i: usize, direction: VoteDirection, score: i64) -> usize {
        let len = self.order.len();

        loop {
            let j = match direction {
                VoteDirection::Up => i - 1,
                VoteDirection::Down => i + 1,
            };
            if j < 1 || j >= len {
                break;
            }

            let neighbour = catalog.score_of(&self.order[j]);
            let passes = match direction {
                VoteDirection::Up => neighbour < score,
                VoteDirection::Down => neighbour >= score,
            };
            if !passes {
                break;
            }

            self.order.swap(i, j);
            i = j;
        }

        i
    }

    /// Current head without mutation
    pub fn peek_head(&self) -> Option<&TrackId> {
        self.order.first()
    }

    /// Remove the head; no-op on an empty queue
    pub fn advance(&mut self) -> Option<TrackId> {
        if self.order.is_empty() {
            return None;
        }
        Some(self.order.remove(0))
    }

    pub fn position(&self, track_id: &TrackId) -> Option<usize> {
        self.order.iter().position(|id| id == track_id)
    }

    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.position(track_id).is_some()
    }

    pub fn ids(&self) -> &[TrackId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
