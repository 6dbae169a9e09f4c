//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token metadata. The raw token is never stored, only its keyed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// The user a live token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenOwner {
    pub user_id: i64,
    pub user_active: bool,
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL
/// - [`crate::infrastructure::memory::MemoryStore`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a non-revoked token hash to its owner.
    ///
    /// Returns `Ok(None)` for unknown or revoked tokens.
    async fn find_owner(&self, token_hash: &str) -> Result<Option<TokenOwner>, AppError>;

    /// Stamps `last_used_at` after a successful authentication.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::ValidationFailed`] if the name or hash is already taken.
    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError>;

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token does not exist or is already revoked.
    async fn revoke_token(&self, id: i64) -> Result<(), AppError>;
}
