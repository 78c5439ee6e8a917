use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

const DEFAULT_JSON: &str = "rowburst.json";
const DEFAULT_TOML: &str = "rowburst.toml";

/// Loads a configuration file from the provided path or default locations.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> AppResult<Option<ConfigFile>> {
    if let Some(path) = path {
        return Ok(Some(load_config_file(path)?));
    }

    for candidate in [DEFAULT_JSON, DEFAULT_TOML] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(Some(load_config_file(&path)?));
        }
    }

    Ok(None)
}

/// Reads one `.json` or `.toml` config file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, does not parse, or has an
/// unsupported extension.
pub fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}

/// Writes the record as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub fn save_config_file(path: &Path, config: &ConfigFile) -> AppResult<()> {
    let mut content = serde_json::to_string_pretty(config)
        .map_err(|err| AppError::config(ConfigError::SerializeJson { source: err }))?;
    content.push('\n');
    std::fs::write(path, content).map_err(|err| {
        AppError::config(ConfigError::WriteConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })
}
