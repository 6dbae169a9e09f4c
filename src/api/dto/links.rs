//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{CreateLink, UpdateLink};
use crate::domain::entities::ShortLink;

/// Request body for `POST /api/urls`.
///
/// ```json
/// {
///   "original_url": "example.com/landing",
///   "slug": "spring-sale",
///   "title": "Spring sale",
///   "expires_at": "2026-12-31T23:59:59Z"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(alias = "originalUrl", alias = "url")]
    pub original_url: String,

    /// Blank or absent means "generate one".
    #[serde(default, alias = "customSlug")]
    pub slug: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        Self {
            original_url: req.original_url,
            slug: req.slug,
            title: req.title,
            description: req.description,
            expires_at: req.expires_at,
        }
    }
}

/// Request body for `PUT /api/urls/{id}`.
///
/// Only provided fields change. For `title`, `description` and `expires_at`:
///
/// - **Absent** → leave unchanged
/// - **`null`** → clear
/// - **Value** → set
#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default, alias = "originalUrl", alias = "url")]
    pub original_url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, alias = "isActive")]
    pub is_active: Option<bool>,

    #[serde(
        default,
        alias = "expiresAt",
        with = "::serde_with::rust::double_option"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateLinkRequest> for UpdateLink {
    fn from(req: UpdateLinkRequest) -> Self {
        Self {
            slug: req.slug,
            original_url: req.original_url,
            title: req.title,
            description: req.description,
            is_active: req.is_active,
            expires_at: req.expires_at,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Clone, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub slug: String,
    pub short_url: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub visit_count: i64,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            id: link.id,
            slug: link.slug,
            short_url,
            original_url: link.original_url,
            title: link.title,
            description: link.description,
            is_active: link.is_active,
            visit_count: link.visit_count,
            last_visited_at: link.last_visited_at,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_camel_case() {
        let req: CreateLinkRequest = serde_json::from_str(
            r#"{"originalUrl": "example.com", "customSlug": "promo", "expiresAt": "2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(req.original_url, "example.com");
        assert_eq!(req.slug.as_deref(), Some("promo"));
        assert!(req.expires_at.is_some());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"title": null, "isActive": false}"#).unwrap();

        assert_eq!(req.title, Some(None));
        assert_eq!(req.description, None);
        assert_eq!(req.expires_at, None);
        assert_eq!(req.is_active, Some(false));

        let input: UpdateLink = req.into();
        assert!(!input.is_empty());
    }

    #[test]
    fn test_empty_update_body() {
        let req: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        assert!(UpdateLink::from(req).is_empty());
    }
}
