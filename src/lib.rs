//! Core library for the `rowburst` CLI.
//!
//! Turns each data row of a CSV file into one JSON POST against a target
//! service. Rows are mapped to typed parameters, gated to a fixed request
//! rate, fanned out over a bounded worker pool and retried with backoff.
//! Log lines and progress flow to a single presenter through the event
//! sink. The `rowburst` binary is the primary interface; library APIs may
//! evolve with it.
pub mod args;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod events;
pub mod http;
pub mod params;
