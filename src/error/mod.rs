mod app;
mod config;
mod http;
mod mapping;
mod run;
mod validation;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use mapping::{ConvertError, MappingError};
pub use run::RunError;
pub use validation::ValidationError;
