//! Bearer token authentication.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes in a freshly issued token.
const TOKEN_BYTES: usize = 32;

/// Hashes a raw token with HMAC-SHA256 keyed by the server signing secret.
///
/// Returns a 64-character lowercase hex-encoded MAC. Shared by the server and the admin CLI,
/// which must agree on the secret.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates an opaque URL-safe token from 32 random bytes.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Resolves bearer tokens to the id of an active user.
///
/// Tokens are hashed before lookup, so the database only ever sees the keyed hash. An attacker
/// with read-only database access cannot verify or forge tokens without the secret.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// `signing_secret` must match the value used when tokens were issued.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns the owning user's id.
    ///
    /// Stamps `last_used_at` on success; a failure to stamp does not fail the request.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] if the token is empty, unknown or revoked
    /// - [`AppError::Forbidden`] if the token belongs to a deactivated user
    /// - [`AppError::StorageUnavailable`] / [`AppError::Internal`] on database errors
    pub async fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Missing bearer token"}),
            ));
        }

        let token_hash = hash_token(&self.signing_secret, token);

        let Some(owner) = self.repository.find_owner(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if !owner.user_active {
            tracing::warn!(user_id = owner.user_id, "Token used by inactive user");
            return Err(AppError::forbidden(
                "User account is disabled",
                json!({"user_id": owner.user_id}),
            ));
        }

        let _ = self.repository.update_last_used(&token_hash).await;

        Ok(owner.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockTokenRepository, TokenOwner};

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let token = "valid-token";
        let expected_hash = hash_token(&test_secret(), token);

        mock_repo
            .expect_find_owner()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(|_| {
                Ok(Some(TokenOwner {
                    user_id: 7,
                    user_active: true,
                }))
            });

        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        assert_eq!(service.authenticate(token).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_owner()
            .times(1)
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("invalid-token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_empty_token_skips_lookup() {
        let mut mock_repo = MockTokenRepository::new();
        mock_repo.expect_find_owner().times(0);

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("  ").await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_inactive_user_forbidden() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo.expect_find_owner().returning(|_| {
            Ok(Some(TokenOwner {
                user_id: 3,
                user_active: false,
            }))
        });
        mock_repo.expect_update_last_used().times(0);

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("some-token").await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_last_used_failure_is_ignored() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo.expect_find_owner().returning(|_| {
            Ok(Some(TokenOwner {
                user_id: 1,
                user_active: true,
            }))
        });
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(AppError::storage_unavailable("pool timed out")));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        assert_eq!(service.authenticate("token").await.unwrap(), 1);
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token");
        let hash2 = hash_token(&test_secret(), "test-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, hash_token(&test_secret(), "other-token"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(hash_token("secret-a", "token"), hash_token("secret-b", "token"));
    }

    #[test]
    fn test_generated_tokens_are_url_safe_and_unique() {
        let a = generate_token();
        let b = generate_token();

        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
