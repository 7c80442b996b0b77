//! JSON output types for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same bytes (field order, array order)
//! 3. **Versioned:** `schema_version` on every response

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use migrant_core::error::{MigrantError, OutputErrorCode};
use migrant_core::{Diagnostic, RecipeDescriptor};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Errors
// ============================================================================

/// Error details in an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the process exit code.
    pub code: u8,
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &MigrantError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();
        let details = match err {
            MigrantError::FileNotFound { path }
            | MigrantError::InvalidSource { path, .. }
            | MigrantError::Io { path, .. } => Some(serde_json::json!({ "path": path })),
            MigrantError::UnknownRecipe { name } => Some(serde_json::json!({ "recipe": name })),
            MigrantError::InvalidArguments { .. }
            | MigrantError::Config(_)
            | MigrantError::Internal { .. } => None,
        };
        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &MigrantError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// List
// ============================================================================

/// Response for `migrant list`.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub status: String,
    pub schema_version: String,
    pub recipes: Vec<RecipeDescriptor>,
}

impl ListResponse {
    pub fn new(recipes: Vec<RecipeDescriptor>) -> Self {
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            recipes,
        }
    }
}

// ============================================================================
// Run
// ============================================================================

/// Per-file result of `migrant run`.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    pub changed: bool,
    /// True when the rewritten tree was written back.
    pub written: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Totals across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub changed: usize,
    pub diagnostics: usize,
}

/// Response for `migrant run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub status: String,
    pub schema_version: String,
    /// Recipe names, in the order they ran.
    pub recipes: Vec<String>,
    pub files: Vec<FileResult>,
    pub summary: RunSummary,
}

impl RunResponse {
    pub fn new(recipes: Vec<String>, files: Vec<FileResult>) -> Self {
        let summary = RunSummary {
            files: files.len(),
            changed: files.iter().filter(|f| f.changed).count(),
            diagnostics: files.iter().map(|f| f.diagnostics.len()).sum(),
        };
        RunResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            recipes,
            files,
            summary,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let err = MigrantError::unknown_recipe("nope");
        let response = ErrorResponse::from_error(&err);

        let mut out = Vec::new();
        emit_response(&response, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["error"]["code"], 3);
        assert_eq!(value["error"]["details"]["recipe"], "nope");
    }

    #[test]
    fn test_status_is_first_field() {
        let response = RunResponse::new(vec![], vec![]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with("{\"status\":\"ok\""));
    }

    #[test]
    fn test_run_summary_totals() {
        let files = vec![
            FileResult {
                path: "a.json".to_string(),
                changed: true,
                written: false,
                diagnostics: vec![],
            },
            FileResult {
                path: "b.json".to_string(),
                changed: false,
                written: false,
                diagnostics: vec![],
            },
        ];
        let response = RunResponse::new(vec!["r".to_string()], files);
        assert_eq!(
            response.summary,
            RunSummary {
                files: 2,
                changed: 1,
                diagnostics: 0,
            }
        );
    }
}
