use serde_json::Value;

use crate::domain::ParamType;
use crate::error::ConvertError;

/// Separators tried in priority order; only the first one present is used.
const LIST_SEPARATORS: [char; 4] = [',', ';', '|', ' '];
/// Whole floats below this magnitude convert to `i64` exactly.
const WHOLE_FLOAT_LIMIT: f64 = 1e18;

/// Converts a raw CSV value into a typed JSON value.
///
/// Empty input yields the zero value of the type. List types never fail;
/// unparsable `int[]` pieces are skipped.
///
/// # Errors
///
/// Returns an error when a scalar `int`, `float` or `bool` cannot be parsed.
pub fn convert(raw: &str, param_type: &ParamType) -> Result<Value, ConvertError> {
    let value = raw.trim();
    match param_type {
        ParamType::String | ParamType::Other(_) => Ok(Value::String(value.to_owned())),
        ParamType::Int => {
            if value.is_empty() {
                return Ok(Value::from(0_i64));
            }
            value
                .parse::<i64>()
                .map(Value::from)
                .map_err(|err| ConvertError::InvalidInt {
                    value: value.to_owned(),
                    source: err,
                })
        }
        ParamType::Float => {
            if value.is_empty() {
                return Ok(Value::from(0_i64));
            }
            let parsed = value
                .parse::<f64>()
                .map_err(|err| ConvertError::InvalidFloat {
                    value: value.to_owned(),
                    source: err,
                })?;
            float_value(parsed).ok_or_else(|| ConvertError::NonFiniteFloat {
                value: value.to_owned(),
            })
        }
        ParamType::Bool => {
            if value.is_empty() {
                return Ok(Value::Bool(false));
            }
            parse_bool(value)
                .map(Value::Bool)
                .ok_or_else(|| ConvertError::InvalidBool {
                    value: value.to_owned(),
                })
        }
        ParamType::StringList => Ok(Value::Array(
            split_list(value)
                .map(|piece| Value::String(piece.to_owned()))
                .collect(),
        )),
        ParamType::IntList => Ok(Value::Array(
            split_list(value)
                .filter_map(|piece| piece.parse::<i64>().ok())
                .map(Value::from)
                .collect(),
        )),
    }
}

/// Whole numbers are written without a fraction (`3`, not `3.0`).
fn float_value(parsed: f64) -> Option<Value> {
    if parsed.fract() == 0.0 && parsed.abs() < WHOLE_FLOAT_LIMIT {
        return Some(Value::from(parsed as i64));
    }
    serde_json::Number::from_f64(parsed).map(Value::Number)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Splits on the first separator present, trims pieces and drops empty ones.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    let separator = LIST_SEPARATORS
        .iter()
        .copied()
        .find(|separator| value.contains(*separator));
    let pieces: Vec<&str> = match separator {
        Some(separator) => value.split(separator).collect(),
        None => vec![value],
    };
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
}
