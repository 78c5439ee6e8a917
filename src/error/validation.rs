use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing target URL (set --url or provide it in config).")]
    MissingUrl,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' has no host.")]
    UrlMissingHost { url: String },
    #[error("Missing CSV input (set --csv).")]
    MissingCsvPath,
    #[error("Config '{field}' must be >= 1 (got {value}).")]
    MustBePositive { field: &'static str, value: i64 },
    #[error("Config '{field}' must be >= 0 (got {value}).")]
    MustNotBeNegative { field: &'static str, value: i64 },
    #[error("Config '{field}' is out of range (got {value}).")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("Endpoint list is empty.")]
    EndpointsEmpty,
    #[error("Invalid param mode '{value}'. Use 'object' or 'array'.")]
    InvalidParamMode { value: String },
    #[error("Invalid array gap policy '{value}'. Use 'shift' or 'null'.")]
    InvalidArrayGaps { value: String },
    #[error("Config '{field}' must not be empty.")]
    FieldEmpty { field: &'static str },
    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid boolean value '{value}'.")]
    InvalidBoolean { value: String },
    #[error("Invalid value for header '{name}'.")]
    InvalidHeaderValue { name: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
