use thiserror::Error;

use crate::config::ConfigError;

/// Quote parsing never fails; these cover the checks around it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("required form field `{0}` is missing")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("could not read `{path}`: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI outcome payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "form_validation",
            Self::Configuration(_) => "config_validation",
            Self::Io { .. } => "io",
            Self::Integration(_) => "webhook",
            Self::Serialization(_) => "serialization",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Domain(_) => 3,
            Self::Io { .. } => 4,
            Self::Integration(_) => 5,
            Self::Serialization(_) => 6,
        }
    }
}
