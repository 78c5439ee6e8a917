use clap::Parser;

use crate::error::{AppError, AppResult};

use super::DriverArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<DriverArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    DriverArgs::try_parse_from(args).map_err(AppError::from)
}
