//! Content session and playlist resolution
//!
//! The provider is an external collaborator: it authenticates a session and
//! resolves a playlist uri into track descriptors.

pub mod local;

pub use local::LocalProvider;

use crate::catalog::TrackDescriptor;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated content session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user: String,
    pub opened_at: DateTime<Utc>,
}

impl Session {
    pub fn open(user: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.into(),
            opened_at: Utc::now(),
        }
    }
}

/// Resolved playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub uri: String,
    pub name: String,
    pub tracks: Vec<TrackDescriptor>,
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fails with `Error::Auth` when credentials are rejected
    async fn login(&self, user: &str, password: &str) -> Result<Session>;

    /// Fails with `Error::PlaylistNotFound` when the uri cannot be resolved
    async fn resolve_playlist(&self, session: &Session, uri: &str) -> Result<Playlist>;

    async fn close(&self, session: Session) -> Result<()>;
}
