//! Application error taxonomy and HTTP mapping.
//!
//! Every failure that crosses a layer boundary is an [`AppError`]. Handlers return it directly;
//! [`IntoResponse`] renders a uniform JSON envelope:
//!
//! ```json
//! { "error": { "code": "slug_conflict", "message": "...", "details": { } } }
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::db_error::is_unique_violation_on_slug;

/// Response envelope for errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// A single input validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Slug failed format validation or hits a reserved prefix.
    #[error("{message}")]
    InvalidSlug { message: String, details: Value },

    /// An explicitly requested slug is already held by an active link.
    #[error("Slug '{slug}' is already taken")]
    SlugConflict { slug: String },

    /// The storage unique constraint rejected the insert (allocation race lost).
    #[error("Slug is already in use")]
    DuplicateSlug { details: Value },

    /// Random generation could not find a free slug within the retry budget.
    #[error("Unable to allocate a unique slug after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Expired { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    ValidationFailed {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn invalid_slug(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidSlug {
            message: message.into(),
            details,
        }
    }

    pub fn slug_conflict(slug: impl Into<String>) -> Self {
        Self::SlugConflict { slug: slug.into() }
    }

    pub fn duplicate_slug(details: Value) -> Self {
        Self::DuplicateSlug { details }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn expired(message: impl Into<String>, details: Value) -> Self {
        Self::Expired {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }

    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    /// Shorthand for a validation failure on a single field.
    pub fn invalid_field(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        let error = FieldError::new(field, message, code);
        Self::ValidationFailed {
            message: error.message.clone(),
            errors: vec![error],
        }
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSlug { .. }
            | Self::SlugConflict { .. }
            | Self::DuplicateSlug { .. }
            | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::AllocationExhausted { .. } | Self::StorageUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Expired { .. } => StatusCode::GONE,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSlug { .. } => "invalid_slug",
            Self::SlugConflict { .. } => "slug_conflict",
            Self::DuplicateSlug { .. } => "duplicate_slug",
            Self::AllocationExhausted { .. } => "allocation_exhausted",
            Self::NotFound { .. } => "not_found",
            Self::Expired { .. } => "expired",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let details = match self {
            Self::InvalidSlug { details, .. }
            | Self::DuplicateSlug { details }
            | Self::NotFound { details, .. }
            | Self::Expired { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Forbidden { details, .. }
            | Self::Internal { details, .. } => details.clone(),
            Self::SlugConflict { slug } => json!({ "slug": slug }),
            Self::AllocationExhausted { attempts } => json!({ "attempts": attempts }),
            Self::ValidationFailed { errors, .. } => json!({ "errors": errors }),
            Self::StorageUnavailable { .. } => json!({}),
        };

        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        // RFC 6750
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on_slug(&e) {
            return AppError::duplicate_slug(json!({ "constraint": "short_links_active_slug_key" }));
        }

        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::invalid_field(
                db.constraint().unwrap_or("unknown"),
                "Value already exists",
                "unique",
            );
        }

        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                tracing::warn!(error = ?e, "Database is unreachable");
                AppError::storage_unavailable("Database is unreachable")
            }
            other => {
                tracing::error!(error = ?other, "Database error");
                AppError::internal("Database error", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    FieldError::new(
                        field.to_string(),
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value for '{field}'")),
                        err.code.to_string(),
                    )
                })
            })
            .collect();

        fields.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::validation("Validation failed", fields)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_field("body", rejection.body_text(), "invalid_json")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid_field("query", rejection.body_text(), "invalid_query")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid_field("path", rejection.body_text(), "invalid_path")
    }
}
