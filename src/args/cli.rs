use clap::Parser;
use std::path::PathBuf;

use super::parsers::{parse_bool_env, parse_endpoint, parse_positive_u32, parse_positive_usize};
use super::types::{GapsArg, ModeArg, PositiveU32, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Batch HTTP load driver - one rate-limited POST per CSV row, with retries, live progress and clean cancellation."
)]
pub struct DriverArgs {
    /// Path to config file (TOML/JSON). Defaults to ./rowburst.json or ./rowburst.toml if present.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// CSV file to drive the run (first row is the header)
    #[arg(long, short = 'f', env = "ROWBURST_CSV")]
    pub csv: Option<PathBuf>,

    /// Target URL every row is POSTed to
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Endpoint address injected into each body; repeat to spread rows over several
    #[arg(long = "endpoint", short = 'e', value_parser = parse_endpoint)]
    pub endpoints: Vec<String>,

    /// Cookie header sent with every request
    #[arg(long)]
    pub cookie: Option<String>,

    /// Request body template (a JSON object)
    #[arg(long = "body")]
    pub body_template: Option<String>,

    /// Maximum requests per second across all workers
    #[arg(long, value_parser = parse_positive_u32)]
    pub qps: Option<PositiveU32>,

    /// Number of concurrent workers
    #[arg(long, short = 'w', value_parser = parse_positive_usize)]
    pub workers: Option<PositiveUsize>,

    /// Attempts per row before it is reported as failed
    #[arg(long, short = 'r')]
    pub retries: Option<u32>,

    /// Shape of the generated params
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// What array mode does with a value that fails to convert
    #[arg(long = "array-gaps", value_enum)]
    pub array_gaps: Option<GapsArg>,

    /// Write the effective config as JSON to this path and exit
    #[arg(long = "save-config")]
    pub save_config: Option<PathBuf>,

    /// Enable verbose logging (sets log level to debug unless overridden by ROWBURST_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
