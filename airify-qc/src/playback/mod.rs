//! Playback sequencing and the sink it drives

pub mod sequencer;
pub mod sink;

pub use sequencer::{RunSummary, Sequencer};
pub use sink::{PlaybackSink, SimulatedSink, SinkEvent};
