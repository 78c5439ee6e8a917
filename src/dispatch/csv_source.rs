use std::io;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{AppError, AppResult, RunError};

/// Where a run reads its rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSource {
    Path(PathBuf),
    /// In-memory CSV text.
    Text(String),
}

/// Every row read before the first malformed record, header included.
/// Fields that are not valid UTF-8 are decoded lossily, never rejected.
#[derive(Debug, Default)]
pub(crate) struct CsvRows {
    pub(crate) rows: Vec<Vec<String>>,
    /// Set when reading stopped early on an unreadable record.
    pub(crate) stopped_at: Option<csv::Error>,
}

impl CsvSource {
    /// Reads all rows eagerly. Files are read on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the reader task
    /// fails.
    pub(crate) async fn read(self) -> AppResult<CsvRows> {
        match self {
            CsvSource::Text(text) => Ok(collect_rows(reader_builder().from_reader(text.as_bytes()))),
            CsvSource::Path(path) => tokio::task::spawn_blocking(move || read_file(path))
                .await
                .map_err(|err| AppError::run(RunError::CsvTask { source: err }))?,
        }
    }
}

fn read_file(path: PathBuf) -> AppResult<CsvRows> {
    match reader_builder().from_path(&path) {
        Ok(reader) => Ok(collect_rows(reader)),
        Err(err) => Err(AppError::run(RunError::OpenCsv { path, source: err })),
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

fn collect_rows<R: io::Read>(mut reader: csv::Reader<R>) -> CsvRows {
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        match record {
            Ok(record) => rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            ),
            Err(err) => {
                warn!("CSV reading stopped after {} rows: {}", rows.len(), err);
                return CsvRows {
                    rows,
                    stopped_at: Some(err),
                };
            }
        }
    }
    CsvRows {
        rows,
        stopped_at: None,
    }
}
