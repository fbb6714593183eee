//! # Airify Queue Controller Library (airify-qc)
//!
//! Plays a fixed playlist through one output device while clients reorder
//! the remaining tracks by voting.
//!
//! **Components:**
//! - `catalog`: immutable track metadata with per-track scores
//! - `queue`: play order and vote-driven repositioning
//! - `playback`: sequencer state machine and the sink it drives
//! - `api`: HTTP/SSE control interface
//! - `provider`: content session and playlist resolution

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod playback;
pub mod provider;
pub mod queue;
pub mod state;

pub use error::{Error, Result};
pub use state::SharedState;
