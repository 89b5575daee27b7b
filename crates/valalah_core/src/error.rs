//! # Effect Error Types
//!
//! Every failure a theme can hit. None of these are fatal: the controllers
//! log them and carry on with fewer visuals.

use thiserror::Error;

/// Errors that can occur while running a visual effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The visual subsystem refused to create or update a node.
    #[error("surface error: {0}")]
    Surface(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The audio backend could not load or play a sound.
    #[error("audio unavailable: {0}")]
    Audio(String),
}

/// Result type for effect operations.
pub type EffectResult<T> = Result<T, EffectError>;

impl From<toml::de::Error> for EffectError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
