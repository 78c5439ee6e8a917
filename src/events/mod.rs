//! Log and progress events flowing from the core to a single presenter.
mod consumer;
mod sink;


pub use consumer::{EventRenderer, spawn_event_consumer};
pub use sink::{EventSink, EventStream, ProgressSnapshot, SinkSettings, event_channels};
