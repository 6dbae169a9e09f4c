//! ShortLink entity: a slug mapped to a destination URL.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted short link.
///
/// Entities are plain snapshots. Every mutation goes through a repository call that returns a
/// fresh copy; nothing here holds a connection to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortLink {
    pub id: i64,
    pub slug: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub visit_count: i64,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    /// Returns true if the link carries an expiry that is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Anonymous links can be followed but never listed or edited.
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == Some(owner_id)
    }
}

/// Input for inserting a link. The slug is already allocated and the URL normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub slug: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. For the nullable columns, `Some(None)` clears the value
/// and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortLinkPatch {
    pub slug: Option<String>,
    pub original_url: Option<String>,
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl ShortLinkPatch {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.original_url.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.expires_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>) -> ShortLink {
        let now = Utc::now();
        ShortLink {
            id: 1,
            slug: "promo".to_string(),
            original_url: "https://example.com".to_string(),
            title: None,
            description: None,
            owner_id: Some(7),
            is_active: true,
            visit_count: 0,
            last_visited_at: None,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_no_expiry_never_expires() {
        assert!(!link(None).is_expired());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let at = Utc::now();
        let l = link(Some(at));
        assert!(l.is_expired_at(at));
        assert!(!l.is_expired_at(at - Duration::milliseconds(1)));
    }

    #[test]
    fn test_past_expiry() {
        assert!(link(Some(Utc::now() - Duration::hours(1))).is_expired());
        assert!(!link(Some(Utc::now() + Duration::hours(1))).is_expired());
    }

    #[test]
    fn test_ownership() {
        let l = link(None);
        assert!(l.is_owned_by(7));
        assert!(!l.is_owned_by(8));

        let anonymous = ShortLink {
            owner_id: None,
            ..l
        };
        assert!(!anonymous.is_owned_by(7));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ShortLinkPatch::default().is_empty());

        let clear_expiry = ShortLinkPatch {
            expires_at: Some(None),
            ..Default::default()
        };
        assert!(!clear_expiry.is_empty());
    }
}
