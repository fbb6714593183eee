//! airify-qc configuration
//!
//! Priority: command-line argument > environment variable > TOML file >
//! compiled default.

use crate::error::{Error, Result};
use airify_common::config::{validate_volume, TomlConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_DEVICE_HOST: &str = "localhost";
pub const DEFAULT_VOLUME: u8 = 50;
pub const DEFAULT_SPEED: f64 = 1.0;
/// Slowest accepted playback speed factor
pub const MIN_SPEED: f64 = 0.01;

/// Command-line arguments for airify-qc
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "airify-qc")]
#[command(about = "Vote-driven audio queue controller")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "AIRIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the control API binds to
    #[arg(long, env = "AIRIFY_BIND")]
    pub bind: Option<String>,

    /// Port the control API listens on
    #[arg(short, long, env = "AIRIFY_PORT")]
    pub port: Option<u16>,

    /// Host of the audio output device
    #[arg(long, env = "AIRIFY_DEVICE_HOST")]
    pub device_host: Option<String>,

    /// Port of the audio output device
    #[arg(long, env = "AIRIFY_DEVICE_PORT")]
    pub device_port: Option<u16>,

    /// Password required by the audio output device
    #[arg(long, env = "AIRIFY_DEVICE_PASSWORD")]
    pub device_password: Option<String>,

    /// Content account user name
    #[arg(short, long, env = "AIRIFY_USER")]
    pub user: Option<String>,

    /// Content account password
    #[arg(long, env = "AIRIFY_PASSWORD")]
    pub password: Option<String>,

    /// Playlist uri to play
    #[arg(long, env = "AIRIFY_PLAYLIST")]
    pub playlist: Option<String>,

    /// Directory holding local playlist manifests
    #[arg(long, env = "AIRIFY_PLAYLIST_DIR")]
    pub playlist_dir: Option<PathBuf>,

    /// Device volume, 0-100
    #[arg(long, env = "AIRIFY_VOLUME")]
    pub volume: Option<u8>,

    /// Shuffle tracks before play
    #[arg(long, env = "AIRIFY_SHUFFLE")]
    pub shuffle: bool,

    /// Playback speed factor of the simulated device
    #[arg(long, env = "AIRIFY_SPEED")]
    pub speed: Option<f64>,

    /// Log level for airify crates (overridden by RUST_LOG)
    #[arg(long, env = "AIRIFY_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Output device settings
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub volume: u8,
}

impl DeviceConfig {
    /// `host:port` key identifying the device in logs
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub device: DeviceConfig,
    pub user: String,
    pub password: String,
    pub playlist: String,
    pub playlist_dir: PathBuf,
    pub shuffle: bool,
    pub speed: f64,
    pub log_level: Option<String>,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::Config(format!("missing required setting: {}", name)))
}

impl Config {
    /// Merge arguments over the TOML file and defaults, then validate
    pub fn resolve(args: Args, file: TomlConfig) -> Result<Self> {
        let config = Config {
            bind: args
                .bind
                .or(file.server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: args.port.or(file.server.port).unwrap_or(DEFAULT_PORT),
            device: DeviceConfig {
                host: args
                    .device_host
                    .or(file.device.host)
                    .unwrap_or_else(|| DEFAULT_DEVICE_HOST.to_string()),
                port: required(args.device_port.or(file.device.port), "device port")?,
                password: args.device_password.or(file.device.password),
                volume: args.volume.or(file.device.volume).unwrap_or(DEFAULT_VOLUME),
            },
            user: required(args.user.or(file.account.user), "user")?,
            password: required(args.password.or(file.account.password), "password")?,
            playlist: required(args.playlist.or(file.playback.playlist), "playlist")?,
            playlist_dir: args
                .playlist_dir
                .or(file.playback.playlist_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            shuffle: args.shuffle || file.playback.shuffle.unwrap_or(false),
            speed: args.speed.or(file.playback.speed).unwrap_or(DEFAULT_SPEED),
            log_level: args.log_level.or(file.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_volume(self.device.volume)?;

        if !(self.speed.is_finite() && self.speed >= MIN_SPEED) {
            return Err(Error::Config(format!(
                "speed must be a finite value of at least {}, got {}",
                MIN_SPEED, self.speed
            )));
        }
        if self.user.is_empty() {
            return Err(Error::Config("user must not be empty".to_string()));
        }
        if self.playlist.is_empty() {
            return Err(Error::Config("playlist must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address {}:{}: {}", self.bind, self.port, e)))
    }
}
