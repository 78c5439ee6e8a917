use std::num::{NonZeroU32, NonZeroUsize};

use url::Url;

use crate::args::DriverArgs;
use crate::domain::{ArrayGaps, ColumnSelector, ParamMapping, ParamMode, ParamType, RunConfig};
use crate::error::{AppError, AppResult, ValidationError};

use super::types::{ConfigFile, MappingConfig};

const DEFAULT_QPS: i64 = 25;
const DEFAULT_WORKERS: i64 = 100;
const DEFAULT_MAX_RETRIES: i64 = 3;
const DEFAULT_ENDPOINT_FIELD: &str = "ipPort";
const DEFAULT_PARAMS_FIELD: &str = "jsonParam";
const DEFAULT_FAILURE_MARKER: &str = "call failed";
const DEFAULT_BODY_TEMPLATE: &str = "{}";

/// Overlays values given on the command line onto the config record.
pub fn apply_args(config: &mut ConfigFile, args: &DriverArgs) {
    if let Some(url) = args.url.as_ref() {
        config.url = Some(url.clone());
    }
    if let Some(cookie) = args.cookie.as_ref() {
        config.cookie = Some(cookie.clone());
    }
    if let Some(body) = args.body_template.as_ref() {
        config.body_temp = Some(body.clone());
    }
    if !args.endpoints.is_empty() {
        config.ip_list = Some(args.endpoints.clone());
    }
    if let Some(qps) = args.qps {
        config.qps = Some(i64::from(qps.get()));
    }
    if let Some(workers) = args.workers {
        config.workers = Some(i64::try_from(workers.get()).unwrap_or(i64::MAX));
    }
    if let Some(retries) = args.retries {
        config.max_retries = Some(i64::from(retries));
    }
    if let Some(mode) = args.mode {
        config.param_mode = Some(mode.as_str().to_owned());
    }
    if let Some(gaps) = args.array_gaps {
        config.array_gaps = Some(gaps.as_str().to_owned());
    }
}

/// Validates the record and builds the immutable per-run snapshot.
///
/// # Errors
///
/// Returns an error when the URL is missing or invalid, a numeric field is
/// out of range, the endpoint list is empty, a mode is unknown, or a header
/// value cannot be encoded.
pub fn resolve_run_config(config: &ConfigFile) -> AppResult<RunConfig> {
    let (url, target) = parse_target(config.url.as_deref())?;
    let endpoints = normalize_endpoints(config.ip_list.as_deref())?;

    let qps = positive(config.qps, DEFAULT_QPS, "qps")?;
    let qps = u32::try_from(qps)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| out_of_range("qps", qps))?;
    let workers = positive(config.workers, DEFAULT_WORKERS, "workers")?;
    let workers = usize::try_from(workers)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| out_of_range("workers", workers))?;
    let max_retries = config.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
    if max_retries < 0 {
        return Err(AppError::validation(ValidationError::MustNotBeNegative {
            field: "maxRetries",
            value: max_retries,
        }));
    }
    let max_retries =
        u32::try_from(max_retries).map_err(|_overflow| out_of_range("maxRetries", max_retries))?;

    let param_mode = parse_mode(config.param_mode.as_deref())?;
    let array_gaps = parse_gaps(config.array_gaps.as_deref())?;
    let origin = config
        .origin
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| target.origin().ascii_serialization(), str::to_owned);
    let referer = config
        .referer
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| format!("{}/", origin), str::to_owned);

    let resolved = RunConfig {
        url,
        cookie: config
            .cookie
            .as_deref()
            .map(str::trim)
            .filter(|cookie| !cookie.is_empty())
            .map(str::to_owned),
        body_template: config
            .body_temp
            .clone()
            .unwrap_or_else(|| DEFAULT_BODY_TEMPLATE.to_owned()),
        endpoints,
        qps,
        workers,
        max_retries,
        param_mode,
        array_gaps,
        mappings: resolve_mappings(&config.param_mappings),
        endpoint_field: required_field(
            config.endpoint_field.as_deref(),
            DEFAULT_ENDPOINT_FIELD,
            "endpointField",
        )?,
        params_field: required_field(
            config.params_field.as_deref(),
            DEFAULT_PARAMS_FIELD,
            "paramsField",
        )?,
        failure_marker: config
            .failure_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_FAILURE_MARKER.to_owned()),
        origin,
        referer,
    };
    crate::http::build_headers(&resolved)?;
    Ok(resolved)
}

fn parse_target(url: Option<&str>) -> AppResult<(String, Url)> {
    let url = url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    let parsed = Url::parse(url).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: url.to_owned(),
            source: err,
        })
    })?;
    if parsed.host_str().is_none() {
        return Err(AppError::validation(ValidationError::UrlMissingHost {
            url: url.to_owned(),
        }));
    }
    Ok((url.to_owned(), parsed))
}

fn normalize_endpoints(list: Option<&[String]>) -> AppResult<Vec<String>> {
    let endpoints: Vec<String> = list
        .unwrap_or_default()
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect();
    if endpoints.is_empty() {
        return Err(AppError::validation(ValidationError::EndpointsEmpty));
    }
    Ok(endpoints)
}

fn positive(value: Option<i64>, default: i64, field: &'static str) -> AppResult<i64> {
    let value = value.unwrap_or(default);
    if value < 1 {
        return Err(AppError::validation(ValidationError::MustBePositive {
            field,
            value,
        }));
    }
    Ok(value)
}

fn out_of_range(field: &'static str, value: i64) -> AppError {
    AppError::validation(ValidationError::OutOfRange { field, value })
}

fn parse_mode(value: Option<&str>) -> AppResult<ParamMode> {
    match value.map(|mode| mode.trim().to_ascii_lowercase()).as_deref() {
        None | Some("" | "object") => Ok(ParamMode::Object),
        Some("array") => Ok(ParamMode::Array),
        Some(other) => Err(AppError::validation(ValidationError::InvalidParamMode {
            value: other.to_owned(),
        })),
    }
}

fn parse_gaps(value: Option<&str>) -> AppResult<ArrayGaps> {
    match value.map(|gaps| gaps.trim().to_ascii_lowercase()).as_deref() {
        None | Some("" | "shift") => Ok(ArrayGaps::Shift),
        Some("null") => Ok(ArrayGaps::Null),
        Some(other) => Err(AppError::validation(ValidationError::InvalidArrayGaps {
            value: other.to_owned(),
        })),
    }
}

fn required_field(value: Option<&str>, default: &str, field: &'static str) -> AppResult<String> {
    let value = value.map_or(default, str::trim);
    if value.is_empty() {
        return Err(AppError::validation(ValidationError::FieldEmpty { field }));
    }
    Ok(value.to_owned())
}

/// Mappings with a blank column selector are ignored.
fn resolve_mappings(mappings: &[MappingConfig]) -> Vec<ParamMapping> {
    mappings
        .iter()
        .filter(|mapping| !mapping.csv_column.trim().is_empty())
        .map(|mapping| ParamMapping {
            column: ColumnSelector::parse(&mapping.csv_column),
            name: mapping.param_name.trim().to_owned(),
            param_type: ParamType::from_tag(&mapping.param_type),
            default_value: mapping.default_value.clone(),
            array_index: mapping.array_index,
        })
        .collect()
}
