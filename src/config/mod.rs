//! Config record loading, persistence and validation.
mod apply;
mod loader;
pub mod types;


pub use apply::{apply_args, resolve_run_config};
pub use loader::{load_config, load_config_file, save_config_file};
pub use types::{ConfigFile, MappingConfig};
