use clap::ValueEnum;
use std::num::{NonZeroU32, NonZeroUsize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    Object,
    Array,
}

impl ModeArg {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ModeArg::Object => "object",
            ModeArg::Array => "array",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum GapsArg {
    Shift,
    Null,
}

impl GapsArg {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            GapsArg::Shift => "shift",
            GapsArg::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveU32(NonZeroU32);

impl PositiveU32 {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for PositiveU32 {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        NonZeroU32::new(value)
            .map(PositiveU32)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU32 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber {
                value: s.to_owned(),
                source: err,
            })?;
        PositiveU32::try_from(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber {
                value: s.to_owned(),
                source: err,
            })?;
        PositiveUsize::try_from(value)
    }
}
