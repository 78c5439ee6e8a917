//! Run orchestration: CSV ingestion, the producer, the rate gate and the
//! worker pool.
mod csv_source;
mod executor;
mod rate;
mod worker;


pub use crate::domain::RequestTask;
pub use csv_source::CsvSource;
pub use executor::{Dispatcher, RunCounters, RunReport};
