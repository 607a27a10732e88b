//! Error types for dynjta.
//!
//! Errors only come out of construction: loading parameters, building the
//! registry and creating transport resources. Runtime event handling logs
//! and carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for dynjta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring and starting the action server.
#[derive(Debug, Error)]
pub enum Error {
    /// Registry or transport error from dynjta-core
    #[error(transparent)]
    Core(#[from] dynjta_core::Error),

    /// Parameter file not found
    #[error("Parameter file not found: {0}")]
    ParamFileNotFound(PathBuf),

    /// Parameter file is not valid YAML
    #[error("Failed to parse parameters: {0}")]
    ParamParseError(String),

    /// Invalid parameter file structure
    #[error("Invalid parameter file structure: {0}")]
    InvalidParamFileStructure(String),

    /// A parameter has the wrong type or an unusable value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why it was refused
        reason: String,
    },

    /// Neither `topic_list` nor `controller_joint_names` is configured
    #[error("No motion group configured: set 'topic_list' or 'controller_joint_names'")]
    NoGroupConfig,

    /// A watchdog cannot tick with a zero period
    #[error("Watchdog period must be non-zero")]
    ZeroWatchdogPeriod,

    /// Watchdog timers need a tokio runtime
    #[error("No tokio runtime available to drive the watchdog timers")]
    NoRuntime,
}

impl Error {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
