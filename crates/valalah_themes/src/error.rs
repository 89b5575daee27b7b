//! # Theme Error Types

use thiserror::Error;
use valalah_core::EffectError;

/// Errors raised while selecting or building a theme.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// No theme goes by this name.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// The theme's configuration was rejected.
    #[error("theme configuration: {0}")]
    Config(#[from] EffectError),
}

/// Result type for theme operations.
pub type ThemeResult<T> = Result<T, ThemeError>;

impl From<toml::de::Error> for ThemeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(EffectError::from(err))
    }
}
