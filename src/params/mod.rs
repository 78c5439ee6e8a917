//! CSV value conversion and parameter payload assembly.
mod convert;
mod mapper;

#[cfg(test)]
mod tests;

pub use convert::convert;
pub use mapper::{MappedRow, MappingFailure, ParamMapper};
