use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use rowburst::{
    args::DriverArgs,
    config::{ConfigFile, apply_args, load_config, resolve_run_config, save_config_file},
    dispatch::{CsvSource, Dispatcher},
    error::{AppError, AppResult, ValidationError},
    events::{SinkSettings, event_channels, spawn_event_consumer},
};

use crate::shutdown_handlers::setup_signal_shutdown_handler;

use super::{progress::TerminalRenderer, summary};

/// Loads config, applies CLI overrides and runs the CSV to completion or
/// until Ctrl+C. Row failures are reported, not returned as errors.
pub(crate) async fn run_driver(args: DriverArgs) -> AppResult<()> {
    let mut config = load_config(args.config.as_deref())?.unwrap_or_default();
    apply_args(&mut config, &args);

    if let Some(path) = args.save_config.as_deref() {
        save_config_file(path, &config)?;
        info!("Saved config to {}", path.display());
        return Ok(());
    }

    let csv_path = args
        .csv
        .clone()
        .ok_or_else(|| AppError::validation(ValidationError::MissingCsvPath))?;
    let run_config = Arc::new(resolve_config(&config)?);

    let cancel = CancellationToken::new();
    let signal_handle = setup_signal_shutdown_handler(&cancel);

    let settings = SinkSettings::default();
    let (events, stream) = event_channels(&settings);
    let consumer = spawn_event_consumer(stream, settings, TerminalRenderer::new(args.no_color));

    let started = Instant::now();
    let result = Dispatcher::new()
        .run(&cancel, run_config, CsvSource::Path(csv_path), events)
        .await;
    let elapsed = started.elapsed();

    cancel.cancel();
    signal_handle.await?;
    consumer.await?;

    let report = result?;
    summary::print_summary(&report, elapsed);
    Ok(())
}

fn resolve_config(config: &ConfigFile) -> AppResult<rowburst::domain::RunConfig> {
    resolve_run_config(config).inspect_err(|err| {
        tracing::error!("Invalid run configuration: {}", err);
    })
}
