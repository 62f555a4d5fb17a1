//! Errors raised while loading and checking site settings.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Configuration problems that stop the site from starting.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No file at the configured path.
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The file or an environment override could not be read into [`Config`](crate::Config).
    #[error("cannot read configuration: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// A setting is present but unusable.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    /// `site.locale` names no locale chrono can format dates in.
    #[error("unknown date locale `{0}`")]
    Locale(String),
}

impl CoreError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }

    /// The setting this error is about, when it concerns a single one.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSetting { key, .. } => Some(key),
            Self::Locale(_) => Some("site.locale"),
            Self::ConfigNotFound(_) | Self::ConfigSource(_) => None,
        }
    }
}
