use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Another run is already active.")]
    AlreadyActive,
    #[error("Failed to open CSV '{path}': {source}")]
    OpenCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("CSV reader task failed: {source}")]
    CsvTask {
        #[source]
        source: tokio::task::JoinError,
    },
}
