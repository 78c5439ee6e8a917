//! Validated run-time types shared by the mapper, sender and dispatcher.
mod run;
mod task;

pub use run::{ArrayGaps, ColumnSelector, ParamMapping, ParamMode, ParamType, RunConfig};
pub use task::RequestTask;
