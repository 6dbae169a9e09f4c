//! Repository trait for users.

use crate::domain::entities::User;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Creates an active user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ValidationFailed`] if the email is already registered.
    async fn create_user(&self, email: String, password_hash: Option<String>)
    -> Result<User, AppError>;
}
