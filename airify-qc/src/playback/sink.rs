//! Playback sink abstraction
//!
//! The sink is the output device consuming load/play/stop instructions.
//! Completion and device failures come back as [`SinkEvent`]s on an mpsc
//! channel rather than callbacks.

use crate::catalog::{Track, TrackId};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Events raised asynchronously by a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// The current track ended naturally
    TrackEnded,
    /// Another controller took over the device
    DeviceLost(String),
    /// Unrecoverable device error
    Error(String),
}

/// Output device
///
/// `stop` must succeed when nothing is loaded.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    async fn load(&self, track: &Track) -> Result<()>;
    async fn play(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn set_volume(&self, volume: u8) -> Result<()>;
}

#[derive(Default)]
struct SimulatedInner {
    loaded: Option<(TrackId, Duration)>,
    timer: Option<JoinHandle<()>>,
    volume: u8,
}

/// In-process sink that plays each track by waiting out its duration
///
/// `speed` divides the wait, so `speed = 60.0` plays a 3 minute track in 3 s.
pub struct SimulatedSink {
    device: String,
    password: Option<String>,
    speed: f64,
    events: mpsc::UnboundedSender<SinkEvent>,
    inner: Mutex<SimulatedInner>,
}

impl SimulatedSink {
    /// Create a sink and the receiver for its events
    pub fn new(device: impl Into<String>, speed: f64) -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let sink = Self {
            device: device.into(),
            password: None,
            speed,
            events,
            inner: Mutex::new(SimulatedInner::default()),
        };
        (sink, rx)
    }

    /// Password presented to the device when connecting
    pub fn with_password(mut self, password: Option<String>) -> Self {
        if password.is_some() {
            debug!("{}: using device password", self.device);
        }
        self.password = password;
        self
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Handle for injecting events, e.g. a device-lost notification
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SinkEvent> {
        self.events.clone()
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn volume(&self) -> u8 {
        self.inner.lock().map(|inner| inner.volume).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SimulatedInner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Sink(format!("{}: sink state poisoned", self.device)))
    }
}

#[async_trait]
impl PlaybackSink for SimulatedSink {
    async fn load(&self, track: &Track) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        debug!("{}: load {}", self.device, track.id);
        inner.loaded = Some((track.id.clone(), track.duration));
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut inner = self.lock()?;
        let (track_id, duration) = inner
            .loaded
            .clone()
            .ok_or_else(|| Error::Sink(format!("{}: play without a loaded track", self.device)))?;

        let wait = Duration::try_from_secs_f64(duration.as_secs_f64() / self.speed).map_err(|e| {
            Error::Sink(format!(
                "{}: cannot play {} at speed {}: {}",
                self.device, track_id, self.speed, e
            ))
        })?;
        let events = self.events.clone();
        let device = self.device.clone();
        debug!("{}: play {} ({:?} simulated)", self.device, track_id, wait);

        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            debug!("{}: track {} ended", device, track_id);
            // Receiver gone means the run is over
            let _ = events.send(SinkEvent::TrackEnded);
        }));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        if inner.loaded.take().is_some() {
            debug!("{}: stop", self.device);
        }
        Ok(())
    }

    async fn set_volume(&self, volume: u8) -> Result<()> {
        let volume = airify_common::config::validate_volume(volume)?;
        self.lock()?.volume = volume;
        info!("{}: volume set to {}", self.device, volume);
        Ok(())
    }
}
