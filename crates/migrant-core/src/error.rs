//! Error types and exit codes for migrant.
//!
//! Rewrites never fail as a whole: a template that cannot be spliced is
//! reported as a [`Diagnostic`](crate::visitor::Diagnostic) and the occurrence
//! is left alone. The errors here are for the driver layer (loading sources,
//! reading config, naming recipes) and surface through the CLI.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, malformed source or config)
//! - `3`: Resolution errors (file or recipe not found)
//! - `4`: Apply errors (failed to write results)
//! - `10`: Internal errors

use std::fmt;

use thiserror::Error;

use crate::tree::TreeError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable exit codes that also appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, unknown recipe).
    ResolutionError = 3,
    /// Apply errors (failed to write changes).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Driver-level error, rendered as JSON by the CLI.
#[derive(Debug, Error)]
pub enum MigrantError {
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A source file that does not deserialize or violates the arena invariants.
    #[error("invalid source {path}: {reason}")]
    InvalidSource { path: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown recipe: {name}")]
    UnknownRecipe { name: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<&MigrantError> for OutputErrorCode {
    fn from(err: &MigrantError) -> Self {
        match err {
            MigrantError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            MigrantError::InvalidSource { .. } => OutputErrorCode::InvalidArguments,
            MigrantError::Config(_) => OutputErrorCode::InvalidArguments,
            MigrantError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            MigrantError::UnknownRecipe { .. } => OutputErrorCode::ResolutionError,
            MigrantError::Io { .. } => OutputErrorCode::ApplyError,
            MigrantError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl MigrantError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        MigrantError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        MigrantError::FileNotFound { path: path.into() }
    }

    pub fn invalid_source(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        MigrantError::InvalidSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_recipe(name: impl Into<String>) -> Self {
        MigrantError::UnknownRecipe { name: name.into() }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        MigrantError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        MigrantError::Internal {
            message: message.into(),
        }
    }

    /// Attach a path to a tree validation failure.
    pub fn from_tree(path: impl Into<String>, err: TreeError) -> Self {
        Self::invalid_source(path, err)
    }

    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}
