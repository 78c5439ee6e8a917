use std::num::{NonZeroU32, NonZeroUsize};

/// Shape of the generated parameter payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamMode {
    #[default]
    Object,
    Array,
}

impl ParamMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ParamMode::Object => "object",
            ParamMode::Array => "array",
        }
    }
}

/// What array mode does with a mapping that failed to convert.
///
/// `Shift` drops the value, so every later position moves left by one.
/// `Null` keeps the position and writes `null` there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayGaps {
    #[default]
    Shift,
    Null,
}

impl ArrayGaps {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ArrayGaps::Shift => "shift",
            ArrayGaps::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Int,
    Float,
    Bool,
    StringList,
    IntList,
    /// Unrecognised tag; values pass through as trimmed strings.
    Other(String),
}

impl ParamType {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "string" => ParamType::String,
            "int" => ParamType::Int,
            "float" => ParamType::Float,
            "bool" => ParamType::Bool,
            "string[]" => ParamType::StringList,
            "int[]" => ParamType::IntList,
            other => ParamType::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::StringList => "string[]",
            ParamType::IntList => "int[]",
            ParamType::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    Index(usize),
    /// A numeric selector below zero; never matches a field.
    Negative,
    Name(String),
}

impl ColumnSelector {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(index) => {
                usize::try_from(index).map_or(ColumnSelector::Negative, ColumnSelector::Index)
            }
            Err(_) => ColumnSelector::Name(raw.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMapping {
    pub column: ColumnSelector,
    pub name: String,
    pub param_type: ParamType,
    pub default_value: String,
    pub array_index: i64,
}

/// Immutable, validated snapshot of everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub url: String,
    pub cookie: Option<String>,
    pub body_template: String,
    pub endpoints: Vec<String>,
    pub qps: NonZeroU32,
    pub workers: NonZeroUsize,
    pub max_retries: u32,
    pub param_mode: ParamMode,
    pub array_gaps: ArrayGaps,
    pub mappings: Vec<ParamMapping>,
    pub endpoint_field: String,
    pub params_field: String,
    pub failure_marker: String,
    pub origin: String,
    pub referer: String,
}

impl RunConfig {
    /// Queue capacity for one run: twice the worker count.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.workers.get().saturating_mul(2)
    }
}
