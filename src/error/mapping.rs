use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid int '{value}': {source}")]
    InvalidInt {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid float '{value}': {source}")]
    InvalidFloat {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("float '{value}' is not finite")]
    NonFiniteFloat { value: String },
    #[error("invalid bool '{value}'")]
    InvalidBool { value: String },
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("row has {len} fields, legacy mapping needs at least 5")]
    RowTooShort { len: usize },
    #[error("failed to serialize params: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}
