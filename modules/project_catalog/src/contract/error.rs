//! Contract error types for the project catalog
//!
//! These errors are transport-agnostic; the REST layer maps them to
//! RFC-9457 problem responses.

/// Project catalog domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Entity addressed by path does not exist (or is not visible to the caller)
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (project, tag, application, ...)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Invalid input: missing field, duplicate unique value, bad file, bad filter
    #[error("validation error on '{field}': {message}")]
    Validation {
        /// Offending field or query parameter
        field: String,
        /// Human-readable message
        message: String,
    },

    /// No credentials were presented, or they were not valid
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// Credentials are valid but do not grant this operation
    #[error("you do not have permission to perform this action")]
    Forbidden,

    /// Operation would break a reference that is not cleaned up automatically
    #[error("conflict: {reason}")]
    Conflict {
        /// Conflict reason
        reason: String,
    },

    /// Uploaded file could not be stored
    #[error("storage failure: {message}")]
    Storage {
        /// Error details
        message: String,
    },

    /// Internal error
    #[error("internal error")]
    Internal,
}

impl CatalogError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Log a repository/infra failure and collapse it to `Internal`
    pub fn internal(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "project catalog internal failure");
        Self::Internal
    }
}
