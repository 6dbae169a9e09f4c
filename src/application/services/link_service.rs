//! Short link lifecycle: create, read, update, soft-delete and list.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::application::services::slug_allocator::SlugAllocator;
use crate::domain::entities::{NewShortLink, Page, ShortLink, ShortLinkPatch};
use crate::domain::repositories::{LinkListQuery, ShortLinkRepository, SortField, SortOrder};
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// How many insert rounds a generated slug gets when it loses a race.
pub const CREATE_ROUNDS: usize = 3;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Largest page whose offset still fits in an `i64` at any page size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Input for [`LinkService::create_link`].
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateLink {
    #[validate(length(
        min = 1,
        max = 2048,
        message = "URL must be between 1 and 2048 characters"
    ))]
    pub original_url: String,

    /// Caller-chosen slug. Blank means "generate one".
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for [`LinkService::update_link`]. Absent fields are left unchanged.
///
/// For `title`, `description` and `expires_at`, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateLink {
    pub slug: Option<String>,

    #[validate(length(
        min = 1,
        max = 2048,
        message = "URL must be between 1 and 2048 characters"
    ))]
    pub original_url: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<Option<String>>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<Option<String>>,

    pub is_active: Option<bool>,

    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateLink {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.original_url.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.expires_at.is_none()
    }
}

/// Input for [`LinkService::list_links`].
#[derive(Debug, Clone, Default, Validate)]
pub struct ListLinks {
    #[validate(range(min = 1, max = MAX_PAGE, message = "Page is out of range"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<i64>,

    #[validate(length(min = 1, max = 100, message = "Search must be 1-100 characters"))]
    pub search: Option<String>,

    pub sort_by: Option<SortField>,

    pub sort_order: Option<SortOrder>,
}

fn normalize_destination(raw: &str) -> Result<String, AppError> {
    normalize_url(raw).map_err(|e| AppError::invalid_field("original_url", e.to_string(), "url"))
}

/// Trims free text; whitespace-only becomes `None`.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn link_not_found(id: i64) -> AppError {
    AppError::not_found("Short link not found", json!({ "id": id }))
}

/// Orchestrates link creation and owner-scoped management.
///
/// Ownership is applied as a query predicate, so a link owned by someone else is reported
/// exactly like a missing one.
pub struct LinkService<R: ShortLinkRepository + ?Sized> {
    repository: Arc<R>,
    allocator: SlugAllocator<R>,
    base_url: String,
}

impl<R: ShortLinkRepository + ?Sized> LinkService<R> {
    pub fn new(repository: Arc<R>, base_url: impl Into<String>) -> Self {
        Self {
            allocator: SlugAllocator::new(Arc::clone(&repository)),
            repository,
            base_url: base_url.into(),
        }
    }

    /// Public short URL for a slug. Response-only, never stored.
    pub fn short_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), slug)
    }

    /// Creates a link, optionally owned.
    ///
    /// A generated slug that loses the insert race is re-allocated, up to
    /// [`CREATE_ROUNDS`] inserts in total. An explicitly requested slug is never swapped.
    ///
    /// # Errors
    ///
    /// - [`AppError::ValidationFailed`] for bad fields or URL
    /// - [`AppError::InvalidSlug`], [`AppError::SlugConflict`],
    ///   [`AppError::AllocationExhausted`] from allocation
    /// - [`AppError::DuplicateSlug`] if the insert race is lost for a requested slug, or
    ///   for every round of generated ones
    pub async fn create_link(
        &self,
        owner_id: Option<i64>,
        input: CreateLink,
    ) -> Result<ShortLink, AppError> {
        input.validate()?;

        let original_url = normalize_destination(&input.original_url)?;
        let title = clean_text(input.title);
        let description = clean_text(input.description);
        let desired = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut round = 1;
        loop {
            let slug = self.allocator.allocate(desired).await?;

            let new_link = NewShortLink {
                slug,
                original_url: original_url.clone(),
                title: title.clone(),
                description: description.clone(),
                owner_id,
                expires_at: input.expires_at,
            };

            match self.repository.create(new_link).await {
                Ok(link) => {
                    metrics::counter!("links_created_total").increment(1);
                    tracing::info!(link_id = link.id, slug = %link.slug, owner_id, "Link created");
                    return Ok(link);
                }
                Err(AppError::DuplicateSlug { .. }) if desired.is_none() && round < CREATE_ROUNDS => {
                    metrics::counter!("slug_allocation_retries_total").increment(1);
                    tracing::warn!(round, "Generated slug lost insert race, reallocating");
                    round += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] unless an active link with that id belongs to `owner_id`.
    pub async fn get_link(&self, id: i64, owner_id: i64) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_id(id, Some(owner_id))
            .await?
            .ok_or_else(|| link_not_found(id))
    }

    /// Applies a partial update to an owned link.
    ///
    /// A changed slug re-runs the desired-slug checks while ignoring the link itself. The
    /// store's uniqueness check still applies; losing that race surfaces
    /// [`AppError::DuplicateSlug`].
    pub async fn update_link(
        &self,
        id: i64,
        owner_id: i64,
        input: UpdateLink,
    ) -> Result<ShortLink, AppError> {
        if input.is_empty() {
            return Err(AppError::invalid_field(
                "body",
                "At least one field must be provided for update",
                "required",
            ));
        }
        input.validate()?;

        let existing = self.get_link(id, owner_id).await?;

        let mut patch = ShortLinkPatch {
            is_active: input.is_active,
            expires_at: input.expires_at,
            title: input.title.map(clean_text),
            description: input.description.map(clean_text),
            ..Default::default()
        };

        if let Some(raw) = input.slug.as_deref() {
            let slug = self.allocator.ensure_available(raw, Some(id)).await?;
            if slug != existing.slug {
                patch.slug = Some(slug);
            }
        }

        if let Some(raw) = input.original_url.as_deref() {
            patch.original_url = Some(normalize_destination(raw)?);
        }

        let updated = self
            .repository
            .update(id, owner_id, patch)
            .await?
            .ok_or_else(|| link_not_found(id))?;

        tracing::info!(link_id = id, slug = %updated.slug, "Link updated");
        Ok(updated)
    }

    /// Soft-deletes an owned link. The slug becomes available again.
    pub async fn delete_link(&self, id: i64, owner_id: i64) -> Result<(), AppError> {
        if !self.repository.soft_delete(id, owner_id).await? {
            return Err(link_not_found(id));
        }

        tracing::info!(link_id = id, owner_id, "Link deleted");
        Ok(())
    }

    /// Lists an owner's active links with search, sorting and offset pagination.
    pub async fn list_links(
        &self,
        owner_id: i64,
        input: ListLinks,
    ) -> Result<Page<ShortLink>, AppError> {
        input.validate()?;

        let query = LinkListQuery {
            page: input.page.unwrap_or(1),
            page_size: input.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            search: clean_text(input.search),
            sort_by: input.sort_by.unwrap_or_default(),
            sort_order: input.sort_order.unwrap_or_default(),
        };

        let (items, total) = self.repository.list(owner_id, &query).await?;

        Ok(Page::new(items, query.page, query.page_size, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockShortLinkRepository;
    use crate::infrastructure::memory::MemoryStore;

    fn stored(id: i64, new_link: &NewShortLink) -> ShortLink {
        let now = Utc::now();
        ShortLink {
            id,
            slug: new_link.slug.clone(),
            original_url: new_link.original_url.clone(),
            title: new_link.title.clone(),
            description: new_link.description.clone(),
            owner_id: new_link.owner_id,
            is_active: true,
            visit_count: 0,
            last_visited_at: None,
            expires_at: new_link.expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_input(url: &str) -> CreateLink {
        CreateLink {
            original_url: url.to_string(),
            ..Default::default()
        }
    }

    fn memory_service() -> LinkService<MemoryStore> {
        LinkService::new(Arc::new(MemoryStore::new()), "http://sho.rt/")
    }

    #[tokio::test]
    async fn test_create_prepends_scheme() {
        let service = memory_service();

        let bare = service
            .create_link(None, create_input("example.com"))
            .await
            .unwrap();
        assert_eq!(bare.original_url, "https://example.com");

        let full = service
            .create_link(None, create_input("https://example.com"))
            .await
            .unwrap();
        assert_eq!(full.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_create_trims_text_fields() {
        let service = memory_service();
        let input = CreateLink {
            title: Some("  Launch  ".to_string()),
            description: Some("   ".to_string()),
            ..create_input("https://example.com")
        };

        let link = service.create_link(Some(1), input).await.unwrap();
        assert_eq!(link.title.as_deref(), Some("Launch"));
        assert!(link.description.is_none());
        assert_eq!(link.owner_id, Some(1));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_url_with_field_error() {
        let service = memory_service();

        let err = service
            .create_link(None, create_input("ftp://example.com"))
            .await
            .unwrap_err();

        match err {
            AppError::ValidationFailed { errors, .. } => {
                assert_eq!(errors[0].field, "original_url");
                assert_eq!(errors[0].code, "url");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let service = memory_service();
        let input = CreateLink {
            title: Some("t".repeat(256)),
            ..create_input("example.com")
        };

        let err = service.create_link(None, input).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn test_short_url_joins_base() {
        let service = memory_service();
        assert_eq!(service.short_url("abc123"), "http://sho.rt/abc123");
    }

    #[tokio::test]
    async fn test_generated_slug_retries_after_lost_race() {
        let mut mock = MockShortLinkRepository::new();
        mock.expect_slug_exists().returning(|_, _| Ok(false));

        let mut seq = mockall::Sequence::new();
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::duplicate_slug(json!({}))));
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|n| Ok(stored(1, &n)));

        let service = LinkService::new(Arc::new(mock), "http://sho.rt");
        let link = service
            .create_link(None, create_input("example.com"))
            .await
            .unwrap();
        assert_eq!(link.id, 1);
    }

    #[tokio::test]
    async fn test_generated_slug_retry_is_bounded() {
        let mut mock = MockShortLinkRepository::new();
        mock.expect_slug_exists().returning(|_, _| Ok(false));
        mock.expect_create()
            .times(CREATE_ROUNDS)
            .returning(|_| Err(AppError::duplicate_slug(json!({}))));

        let service = LinkService::new(Arc::new(mock), "http://sho.rt");
        let err = service
            .create_link(None, create_input("example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug { .. }));
    }

    #[tokio::test]
    async fn test_requested_slug_lost_race_is_not_retried() {
        let mut mock = MockShortLinkRepository::new();
        mock.expect_slug_exists().times(1).returning(|_, _| Ok(false));
        mock.expect_create()
            .times(1)
            .returning(|_| Err(AppError::duplicate_slug(json!({}))));

        let service = LinkService::new(Arc::new(mock), "http://sho.rt");
        let input = CreateLink {
            slug: Some("promo".to_string()),
            ..create_input("example.com")
        };

        let err = service.create_link(None, input).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug { .. }));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_not_found() {
        let service = memory_service();
        let link = service
            .create_link(Some(1), create_input("example.com"))
            .await
            .unwrap();

        let input = UpdateLink {
            title: Some(Some("mine now".to_string())),
            ..Default::default()
        };
        let err = service.update_link(link.id, 2, input).await.unwrap_err();

        match err {
            AppError::NotFound { details, .. } => {
                assert_eq!(details, json!({ "id": link.id }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_requires_a_field() {
        let service = memory_service();
        let err = service
            .update_link(1, 1, UpdateLink::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn test_update_slug_keeps_own_and_rejects_taken() {
        let service = memory_service();
        let a = service
            .create_link(
                Some(1),
                CreateLink {
                    slug: Some("alpha".to_string()),
                    ..create_input("example.com")
                },
            )
            .await
            .unwrap();
        service
            .create_link(
                Some(1),
                CreateLink {
                    slug: Some("bravo".to_string()),
                    ..create_input("example.org")
                },
            )
            .await
            .unwrap();

        let same = UpdateLink {
            slug: Some("ALPHA".to_string()),
            ..Default::default()
        };
        let updated = service.update_link(a.id, 1, same).await.unwrap();
        assert_eq!(updated.slug, "alpha");

        let taken = UpdateLink {
            slug: Some("bravo".to_string()),
            ..Default::default()
        };
        let err = service.update_link(a.id, 1, taken).await.unwrap_err();
        assert!(matches!(err, AppError::SlugConflict { .. }));
    }

    #[tokio::test]
    async fn test_update_surfaces_store_duplicate() {
        let mut mock = MockShortLinkRepository::new();
        mock.expect_find_by_id().returning(|id, owner| {
            Ok(Some(stored(
                id,
                &NewShortLink {
                    slug: "old".to_string(),
                    original_url: "https://example.com".to_string(),
                    title: None,
                    description: None,
                    owner_id: owner,
                    expires_at: None,
                },
            )))
        });
        mock.expect_slug_exists().returning(|_, _| Ok(false));
        mock.expect_update()
            .returning(|_, _, _| Err(AppError::duplicate_slug(json!({}))));

        let service = LinkService::new(Arc::new(mock), "http://sho.rt");
        let input = UpdateLink {
            slug: Some("new".to_string()),
            ..Default::default()
        };

        let err = service.update_link(5, 1, input).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug { .. }));
    }

    #[tokio::test]
    async fn test_update_can_clear_expiry() {
        let service = memory_service();
        let link = service
            .create_link(
                Some(1),
                CreateLink {
                    expires_at: Some(Utc::now() + chrono::Duration::days(1)),
                    ..create_input("example.com")
                },
            )
            .await
            .unwrap();

        let input = UpdateLink {
            expires_at: Some(None),
            ..Default::default()
        };
        let updated = service.update_link(link.id, 1, input).await.unwrap();
        assert!(updated.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let service = memory_service();
        let link = service
            .create_link(Some(1), create_input("example.com"))
            .await
            .unwrap();

        assert!(service.delete_link(link.id, 2).await.is_err());
        service.delete_link(link.id, 1).await.unwrap();

        let err = service.get_link(link.id, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(service.delete_link(link.id, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_list_search_and_pagination() {
        let service = memory_service();
        let links = [
            ("lnk001", "https://github.com/a"),
            ("lnk002", "https://gitlab.com/b"),
            ("lnk003", "https://example.com/c"),
            ("lnk004", "https://GITHUB.com/d"),
            ("lnk005", "https://rust-lang.org"),
        ];
        for (slug, url) in links {
            service
                .create_link(
                    Some(1),
                    CreateLink {
                        slug: Some(slug.to_string()),
                        ..create_input(url)
                    },
                )
                .await
                .unwrap();
        }
        service
            .create_link(
                Some(1),
                CreateLink {
                    slug: Some("lnk006".to_string()),
                    title: Some("My Git notes".to_string()),
                    ..create_input("https://notes.example.com")
                },
            )
            .await
            .unwrap();
        service
            .create_link(
                Some(2),
                CreateLink {
                    slug: Some("lnk007".to_string()),
                    ..create_input("https://github.com/other-owner")
                },
            )
            .await
            .unwrap();

        let first = service
            .list_links(
                1,
                ListLinks {
                    search: Some("git".to_string()),
                    page_size: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.total, 4);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let second = service
            .list_links(
                1,
                ListLinks {
                    search: Some("GIT".to_string()),
                    page: Some(2),
                    page_size: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_next);
        assert!(second.has_prev);

        for link in first.items.iter().chain(second.items.iter()) {
            let haystack = format!(
                "{} {} {}",
                link.slug,
                link.original_url,
                link.title.clone().unwrap_or_default()
            )
            .to_lowercase();
            assert!(haystack.contains("git"));
        }
    }

    #[tokio::test]
    async fn test_list_rejects_page_beyond_offset_range() {
        let service = memory_service();
        let err = service
            .list_links(
                1,
                ListLinks {
                    page: Some(i64::MAX),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed { .. }));

        let last = service
            .list_links(
                1,
                ListLinks {
                    page: Some(MAX_PAGE),
                    page_size: Some(MAX_PAGE_SIZE),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(last.items.is_empty());
        assert!(!last.has_next);
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_page() {
        let service = memory_service();
        let err = service
            .list_links(
                1,
                ListLinks {
                    page_size: Some(101),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed { .. }));
    }
}
