//! Error types for airify-qc
//!
//! Only `NotFound` and `InvalidDirection` are routine, user-facing failures.
//! `Auth` and `Sink` are fatal and end the run.

use crate::catalog::TrackId;
use thiserror::Error;

/// Main error type for airify-qc
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from airify-common
    #[error(transparent)]
    Common(#[from] airify_common::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vote on a track that is not in the queue
    #[error("Track not found in queue: {0}")]
    NotFound(TrackId),

    /// Vote direction other than "up"/"down"
    #[error("Invalid vote direction: {0}")]
    InvalidDirection(String),

    /// Two descriptors share a source locator
    #[error("Duplicate track in playlist: {0}")]
    DuplicateTrack(String),

    /// Content session login rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Playlist uri could not be resolved
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Malformed playlist manifest
    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),

    /// Output device failed or was lost
    #[error("Sink error: {0}")]
    Sink(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error should terminate the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Sink(_))
    }
}

/// Convenience Result type using airify-qc Error
pub type Result<T> = std::result::Result<T, Error>;
