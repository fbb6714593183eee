//! Provider backed by JSON playlist manifests on disk
//!
//! A playlist uri is either `local:<name>`, resolved to
//! `<playlist_dir>/<name>.json`, or a filesystem path. Manifest format:
//!
//! ```json
//! { "name": "Friday", "tracks": [
//!     { "locator": "local:track:1", "title": "...", "artist": "...",
//!       "duration_ms": 215000, "available": true } ] }
//! ```

use super::{CatalogProvider, Playlist, Session};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const URI_SCHEME: &str = "local:";

pub struct LocalProvider {
    playlist_dir: PathBuf,
    user: String,
    password: String,
}

impl LocalProvider {
    /// Provider accepting exactly the given credentials
    pub fn new(playlist_dir: impl Into<PathBuf>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            playlist_dir: playlist_dir.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    fn manifest_path(&self, uri: &str) -> PathBuf {
        match uri.strip_prefix(URI_SCHEME) {
            Some(name) => self.playlist_dir.join(format!("{}.json", name)),
            None => PathBuf::from(uri),
        }
    }

    async fn read_manifest(path: &Path, uri: &str) -> Result<Playlist> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::PlaylistNotFound(uri.to_string()));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let mut playlist: Playlist = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidPlaylist(format!("{}: {}", path.display(), e)))?;
        playlist.uri = uri.to_string();
        Ok(playlist)
    }
}

#[async_trait]
impl CatalogProvider for LocalProvider {
    async fn login(&self, user: &str, password: &str) -> Result<Session> {
        if user.is_empty() {
            return Err(Error::Auth("empty user name".to_string()));
        }
        if user != self.user || password != self.password {
            return Err(Error::Auth(format!("invalid credentials for {}", user)));
        }

        let session = Session::open(user);
        info!("Connected to content provider ({}).", user);
        Ok(session)
    }

    async fn resolve_playlist(&self, session: &Session, uri: &str) -> Result<Playlist> {
        let path = self.manifest_path(uri);
        debug!("Session {} resolving {} from {}", session.id, uri, path.display());

        let playlist = Self::read_manifest(&path, uri).await?;
        info!(
            "Loaded playlist \"{}\" with {} tracks.",
            playlist.name,
            playlist.tracks.len()
        );
        Ok(playlist)
    }

    async fn close(&self, session: Session) -> Result<()> {
        info!("Closed session {} ({})", session.id, session.user);
        Ok(())
    }
}
