//! # Airify Common Library
//!
//! Shared code for the Airify crates including:
//! - Event types (AirifyEvent enum)
//! - Configuration file loading
//! - Human-readable duration formatting
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod time;

pub use error::{Error, Result};
