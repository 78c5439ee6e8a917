use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::domain::{ArrayGaps, ColumnSelector, ParamMapping, ParamMode};
use crate::error::{ConvertError, MappingError};

use super::convert::convert;

/// Legacy schema: first param from this field, kept as raw text.
const LEGACY_TEXT_FIELD: usize = 4;
/// Legacy schema: second param from this field, parsed as int (0 on failure).
const LEGACY_INT_FIELD: usize = 2;
const LEGACY_MIN_FIELDS: usize = 5;

/// A mapping that could not be converted; its value is left out of the payload.
#[derive(Debug)]
pub struct MappingFailure {
    pub label: String,
    pub source: ConvertError,
}

#[derive(Debug)]
pub struct MappedRow {
    /// Compact JSON (object or array).
    pub payload: Vec<u8>,
    pub failures: Vec<MappingFailure>,
}

#[derive(Debug, Clone)]
struct ResolvedMapping {
    mapping: ParamMapping,
    field: Option<usize>,
}

/// Turns CSV rows into parameter payloads.
///
/// Column selectors are resolved once against the header row: numeric
/// selectors are field positions, names are looked up in the header and fall
/// back to the default value when absent. In array mode the mappings are
/// stable-sorted by `array_index` up front.
#[derive(Debug, Clone)]
pub struct ParamMapper {
    mode: ParamMode,
    gaps: ArrayGaps,
    mappings: Vec<ResolvedMapping>,
}

impl ParamMapper {
    #[must_use]
    pub fn new(
        mappings: &[ParamMapping],
        mode: ParamMode,
        gaps: ArrayGaps,
        header: &[String],
    ) -> Self {
        let header = normalize_row(header);
        let mut resolved: Vec<ResolvedMapping> = mappings
            .iter()
            .map(|mapping| ResolvedMapping {
                field: resolve_field(&mapping.column, &header),
                mapping: mapping.clone(),
            })
            .collect();
        if mode == ParamMode::Array {
            resolved.sort_by_key(|entry| entry.mapping.array_index);
        }
        Self {
            mode,
            gaps,
            mappings: resolved,
        }
    }

    /// Builds the payload for one data row.
    ///
    /// # Errors
    ///
    /// Returns an error when the legacy schema is in use and the row is too
    /// short, or when the payload cannot be serialized.
    pub fn map_row(&self, row: &[String]) -> Result<MappedRow, MappingError> {
        let fields = normalize_row(row);
        if self.mappings.is_empty() {
            return legacy_payload(&fields);
        }

        let mut failures = Vec::new();
        let params = match self.mode {
            ParamMode::Object => {
                let mut params = Map::new();
                for entry in &self.mappings {
                    match extract_value(&fields, entry) {
                        Ok(value) => {
                            params.insert(entry.mapping.name.clone(), value);
                        }
                        Err(err) => failures.push(MappingFailure {
                            label: entry.mapping.name.clone(),
                            source: err,
                        }),
                    }
                }
                Value::Object(params)
            }
            ParamMode::Array => {
                let mut params = Vec::with_capacity(self.mappings.len());
                for entry in &self.mappings {
                    match extract_value(&fields, entry) {
                        Ok(value) => params.push(value),
                        Err(err) => {
                            if self.gaps == ArrayGaps::Null {
                                params.push(Value::Null);
                            }
                            failures.push(MappingFailure {
                                label: format!("index {}", entry.mapping.array_index),
                                source: err,
                            });
                        }
                    }
                }
                Value::Array(params)
            }
        };

        let payload =
            serde_json::to_vec(&params).map_err(|err| MappingError::Serialize { source: err })?;
        Ok(MappedRow { payload, failures })
    }
}

/// A single-field row is treated as a tab-delimited line the CSV reader
/// failed to split.
fn normalize_row(row: &[String]) -> Cow<'_, [String]> {
    match row {
        [single] => Cow::Owned(single.split('\t').map(str::to_owned).collect()),
        _ => Cow::Borrowed(row),
    }
}

fn resolve_field(column: &ColumnSelector, header: &[String]) -> Option<usize> {
    match column {
        ColumnSelector::Index(index) => Some(*index),
        ColumnSelector::Negative => None,
        ColumnSelector::Name(name) => header
            .iter()
            .position(|field| field.trim() == name.as_str()),
    }
}

fn extract_value(fields: &[String], entry: &ResolvedMapping) -> Result<Value, ConvertError> {
    let selected = entry
        .field
        .and_then(|index| fields.get(index))
        .map_or(entry.mapping.default_value.as_str(), String::as_str);
    let raw = if selected.trim().is_empty() {
        entry.mapping.default_value.as_str()
    } else {
        selected
    };
    convert(raw, &entry.mapping.param_type)
}

fn legacy_payload(fields: &[String]) -> Result<MappedRow, MappingError> {
    if fields.len() < LEGACY_MIN_FIELDS {
        return Err(MappingError::RowTooShort { len: fields.len() });
    }
    let text = fields
        .get(LEGACY_TEXT_FIELD)
        .map_or_else(String::new, Clone::clone);
    let number = fields
        .get(LEGACY_INT_FIELD)
        .and_then(|field| field.parse::<i64>().ok())
        .unwrap_or(0);
    let params = Value::Array(vec![Value::String(text), Value::from(number)]);
    let payload =
        serde_json::to_vec(&params).map_err(|err| MappingError::Serialize { source: err })?;
    Ok(MappedRow {
        payload,
        failures: Vec::new(),
    })
}
