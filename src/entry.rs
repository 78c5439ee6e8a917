use std::ffi::OsString;
use std::path::Path;

use clap::{CommandFactory, FromArgMatches};

use rowburst::args::DriverArgs;
use rowburst::error::AppResult;

use crate::app::run_driver;

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["rowburst.json", "rowburst.toml"];

pub(crate) fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_driver(args))
}

fn parse_args() -> AppResult<Option<DriverArgs>> {
    let mut cmd = DriverArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = DriverArgs::from_arg_matches(&matches)?;
    Ok(Some(args))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty || std::env::var_os("ROWBURST_CSV").is_some() {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}
