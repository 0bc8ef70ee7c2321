//! Error types for the onboarding flow.

use std::path::PathBuf;

use crate::core::StepId;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Misuse: {0}")]
    Misuse(#[from] MisuseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid step definitions or unknown step references.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("A wizard needs at least one step")]
    EmptyFlow,

    #[error("Step at position {position} has an empty id")]
    EmptyStepId { position: usize },

    #[error("Duplicate step id: {0}")]
    DuplicateStep(StepId),

    #[error("Unknown step: {0}")]
    UnknownStep(StepId),
}

/// Programming errors: a step context used where no wizard backs it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MisuseError {
    #[error("{operation} called on a step context whose wizard no longer exists")]
    Detached { operation: &'static str },

    #[error("Cannot register a handler for unknown step: {0}")]
    UnknownStep(StepId),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] WizardError),
}

/// Login errors, from form validation or the identity service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid or expired code")]
    InvalidCode,

    #[error("No verification code is pending; request a new one")]
    NoPendingCode,

    #[error("Too many requests, please wait before requesting another code")]
    RateLimited,

    #[error("No one is signed in")]
    NotSignedIn,
}

pub type Result<T> = std::result::Result<T, Error>;
