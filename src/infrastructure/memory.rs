//! In-process implementation of the repository traits.
//!
//! A single [`tokio::sync::RwLock`] guards all tables and plays the part of the database:
//! every trait method takes the lock once, so each call is atomic the way one SQL
//! statement is. Active-slug uniqueness is enforced on insert and update exactly like the
//! partial unique index in PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{Click, NewClick, NewShortLink, ShortLink, ShortLinkPatch, User};
use crate::domain::repositories::{
    ApiToken, ClickRepository, LinkListQuery, OwnerSummary, ShortLinkRepository, SortField,
    SortOrder, TokenOwner, TokenRepository, UserRepository,
};
use crate::error::AppError;
use crate::utils::db_error::ACTIVE_SLUG_CONSTRAINT;

const SUMMARY_LIMIT: usize = 5;

#[derive(Default)]
struct Tables {
    last_link_id: i64,
    links: BTreeMap<i64, ShortLink>,
    last_click_id: i64,
    clicks: Vec<Click>,
    last_user_id: i64,
    users: BTreeMap<i64, User>,
    last_token_id: i64,
    tokens: BTreeMap<i64, ApiToken>,
}

impl Tables {
    fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> bool {
        self.links
            .values()
            .any(|l| l.is_active && l.slug == slug && Some(l.id) != exclude_id)
    }

    fn owned_active_mut(&mut self, id: i64, owner_id: i64) -> Option<&mut ShortLink> {
        self.links
            .get_mut(&id)
            .filter(|l| l.is_active && l.is_owned_by(owner_id))
    }
}

fn duplicate_slug() -> AppError {
    AppError::duplicate_slug(json!({ "constraint": ACTIVE_SLUG_CONSTRAINT }))
}

fn directed(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

/// `NULLS LAST` regardless of direction, matching the SQL listing.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.cmp(&y), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_links(a: &ShortLink, b: &ShortLink, field: SortField, order: SortOrder) -> Ordering {
    let primary = match field {
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at), order),
        SortField::UpdatedAt => directed(a.updated_at.cmp(&b.updated_at), order),
        SortField::VisitCount => directed(a.visit_count.cmp(&b.visit_count), order),
        SortField::LastVisitedAt => nulls_last(a.last_visited_at, b.last_visited_at, order),
        SortField::Title => nulls_last(a.title.as_deref(), b.title.as_deref(), order),
    };

    primary.then_with(|| b.id.cmp(&a.id))
}

fn matches_search(link: &ShortLink, needle: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(needle);

    contains(&link.slug)
        || contains(&link.original_url)
        || link.title.as_deref().is_some_and(contains)
        || link.description.as_deref().is_some_and(contains)
}

/// Shared in-memory tables. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShortLinkRepository for MemoryStore {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut tables = self.tables.write().await;

        if tables.slug_taken(&new_link.slug, None) {
            return Err(duplicate_slug());
        }

        tables.last_link_id += 1;
        let now = Utc::now();
        let link = ShortLink {
            id: tables.last_link_id,
            slug: new_link.slug,
            original_url: new_link.original_url,
            title: new_link.title,
            description: new_link.description,
            owner_id: new_link.owner_id,
            is_active: true,
            visit_count: 0,
            last_visited_at: None,
            expires_at: new_link.expires_at,
            created_at: now,
            updated_at: now,
        };

        tables.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .links
            .values()
            .find(|l| l.is_active && l.slug == slug)
            .cloned())
    }

    async fn find_by_id(
        &self,
        id: i64,
        owner_id: Option<i64>,
    ) -> Result<Option<ShortLink>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .links
            .get(&id)
            .filter(|l| l.is_active && owner_id.is_none_or(|o| l.is_owned_by(o)))
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
        Ok(self.tables.read().await.slug_taken(slug, exclude_id))
    }

    async fn record_visit(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if let Some(link) = tables.links.get_mut(&id) {
            link.visit_count += 1;
            link.last_visited_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.owned_active_mut(id, owner_id) {
            Some(link) => {
                link.is_active = false;
                link.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: ShortLinkPatch,
    ) -> Result<Option<ShortLink>, AppError> {
        let mut tables = self.tables.write().await;

        if tables.owned_active_mut(id, owner_id).is_none() {
            return Ok(None);
        }

        if let Some(slug) = patch.slug.as_deref()
            && tables.slug_taken(slug, Some(id))
        {
            return Err(duplicate_slug());
        }

        let Some(link) = tables.owned_active_mut(id, owner_id) else {
            return Ok(None);
        };

        if let Some(slug) = patch.slug {
            link.slug = slug;
        }
        if let Some(original_url) = patch.original_url {
            link.original_url = original_url;
        }
        if let Some(title) = patch.title {
            link.title = title;
        }
        if let Some(description) = patch.description {
            link.description = description;
        }
        if let Some(is_active) = patch.is_active {
            link.is_active = is_active;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        link.updated_at = Utc::now();

        Ok(Some(link.clone()))
    }

    async fn list(
        &self,
        owner_id: i64,
        query: &LinkListQuery,
    ) -> Result<(Vec<ShortLink>, i64), AppError> {
        let tables = self.tables.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matched: Vec<&ShortLink> = tables
            .links
            .values()
            .filter(|l| l.is_active && l.is_owned_by(owner_id))
            .filter(|l| needle.as_deref().is_none_or(|n| matches_search(l, n)))
            .collect();

        matched.sort_by(|a, b| compare_links(a, b, query.sort_by, query.sort_order));

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(query.offset().max(0) as usize)
            .take(query.page_size.max(0) as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn owner_summary(&self, owner_id: i64) -> Result<OwnerSummary, AppError> {
        let tables = self.tables.read().await;

        let mut owned: Vec<&ShortLink> = tables
            .links
            .values()
            .filter(|l| l.is_active && l.is_owned_by(owner_id))
            .collect();

        let total_links = owned.len() as i64;
        let total_visits = owned.iter().map(|l| l.visit_count).sum();

        owned.sort_by(|a, b| b.visit_count.cmp(&a.visit_count).then(b.id.cmp(&a.id)));
        let top_links = owned.iter().take(SUMMARY_LIMIT).map(|l| (*l).clone()).collect();

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let recent_links = owned.iter().take(SUMMARY_LIMIT).map(|l| (*l).clone()).collect();

        Ok(OwnerSummary {
            total_links,
            total_visits,
            top_links,
            recent_links,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record_click(&self, click: NewClick) -> Result<Click, AppError> {
        let mut tables = self.tables.write().await;
        tables.last_click_id += 1;

        let click = Click {
            id: tables.last_click_id,
            link_id: click.link_id,
            ip_address: click.ip_address,
            user_agent: click.user_agent,
            referer: click.referer,
            clicked_at: click.clicked_at,
        };
        tables.clicks.push(click.clone());
        Ok(click)
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }

    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let tables = self.tables.read().await;
        let mut clicks: Vec<Click> = tables
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect();

        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        clicks.truncate(limit.max(0) as usize);
        Ok(clicks)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        email: String,
        password_hash: Option<String>,
    ) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::invalid_field(
                "email",
                "Email is already registered",
                "unique",
            ));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            email,
            password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

impl MemoryStore {
    /// Flips a user's active flag. PostgreSQL deployments do this with plain SQL.
    pub async fn set_user_active(&self, user_id: i64, is_active: bool) {
        if let Some(user) = self.tables.write().await.users.get_mut(&user_id) {
            user.is_active = is_active;
        }
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_owner(&self, token_hash: &str) -> Result<Option<TokenOwner>, AppError> {
        let tables = self.tables.read().await;

        let owner = tables
            .tokens
            .values()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .and_then(|t| tables.users.get(&t.user_id))
            .map(|u| TokenOwner {
                user_id: u.id,
                user_active: u.is_active,
            });

        Ok(owner)
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if let Some(token) = tables
            .tokens
            .values_mut()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .tokens
            .values()
            .any(|t| t.name == name || t.token_hash == token_hash)
        {
            return Err(AppError::invalid_field(
                "name",
                "Token already exists",
                "unique",
            ));
        }

        tables.last_token_id += 1;
        let token = ApiToken {
            id: tables.last_token_id,
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tables.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.tokens.values().rev().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.tokens.values().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        match tables.tokens.get_mut(&id) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(AppError::not_found(
                "Token not found or already revoked",
                json!({ "id": id }),
            )),
        }
    }
}
