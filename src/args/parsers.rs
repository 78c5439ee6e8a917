use super::types::{PositiveU32, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_u32(s: &str) -> AppResult<PositiveU32> {
    s.parse::<PositiveU32>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_endpoint(s: &str) -> AppResult<String> {
    let endpoint = s.trim();
    if endpoint.is_empty() {
        return Err(AppError::validation(ValidationError::FieldEmpty {
            field: "endpoint",
        }));
    }
    Ok(endpoint.to_owned())
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}
