//! Control API
//!
//! HTTP surface for reading the queue and playback state and for voting.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext, ControlInfo};
