//! Unique slug allocation.

use serde_json::json;
use std::sync::Arc;

use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::utils::slug_codec::{self, MAX_LEN, MIN_LEN};

/// Length of the first generated candidate.
pub const INITIAL_LENGTH: usize = 6;

/// Number of generated candidates tried before giving up. Candidate `n` (0-based) is
/// `INITIAL_LENGTH + n` characters long.
pub const MAX_ATTEMPTS: usize = 10;

/// Produces slugs that are free among active links at the time of the check.
///
/// The availability check is advisory: two requests can pass it with the same slug. The
/// store's unique constraint decides the race, and callers handle
/// [`AppError::DuplicateSlug`] from the insert.
pub struct SlugAllocator<R: ShortLinkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: ShortLinkRepository + ?Sized> SlugAllocator<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns a slug for a new link.
    ///
    /// A non-blank `desired` slug goes through [`Self::ensure_available`] and is never
    /// replaced by a random one. Otherwise a random slug is generated.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidSlug`] if the desired slug is malformed or reserved
    /// - [`AppError::SlugConflict`] if the desired slug is held by an active link
    /// - [`AppError::AllocationExhausted`] if no generated candidate was free
    pub async fn allocate(&self, desired: Option<&str>) -> Result<String, AppError> {
        match desired.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => self.ensure_available(raw, None).await,
            None => self.generate().await,
        }
    }

    /// Sanitizes and validates a caller-chosen slug, then checks it is free.
    ///
    /// `exclude_id` lets an update keep its own slug. Format and reserved-prefix checks run
    /// before any storage access.
    pub async fn ensure_available(
        &self,
        raw: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, AppError> {
        let slug = slug_codec::sanitize(raw);

        if !slug_codec::validate_format(&slug) {
            return Err(AppError::invalid_slug(
                format!(
                    "Slug must be {MIN_LEN}-{MAX_LEN} characters of letters, digits, '_' or '-'"
                ),
                json!({ "slug": raw, "sanitized": slug }),
            ));
        }

        if slug_codec::is_reserved(&slug) {
            return Err(AppError::invalid_slug(
                "Slug uses a reserved prefix",
                json!({ "slug": slug, "reserved": slug_codec::RESERVED_PREFIXES }),
            ));
        }

        if self.repository.slug_exists(&slug, exclude_id).await? {
            return Err(AppError::slug_conflict(slug));
        }

        Ok(slug)
    }

    async fn generate(&self) -> Result<String, AppError> {
        for attempt in 0..MAX_ATTEMPTS {
            let candidate = slug_codec::generate_random(INITIAL_LENGTH + attempt);

            if slug_codec::is_reserved(&candidate) {
                continue;
            }

            if !self.repository.slug_exists(&candidate, None).await? {
                return Ok(candidate);
            }

            metrics::counter!("slug_collisions_total").increment(1);
            tracing::debug!(attempt, "Generated slug collided, growing length");
        }

        tracing::error!(attempts = MAX_ATTEMPTS, "Slug allocation exhausted");
        Err(AppError::AllocationExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}
