//! PostgreSQL implementation of the short link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink, ShortLinkPatch};
use crate::domain::repositories::{LinkListQuery, OwnerSummary, ShortLinkRepository};
use crate::error::AppError;

macro_rules! link_columns {
    () => {
        "id, slug, original_url, title, description, owner_id, is_active, visit_count, \
         last_visited_at, expires_at, created_at, updated_at"
    };
}

const SUMMARY_LIMIT: i64 = 5;

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    id: i64,
    slug: String,
    original_url: String,
    title: Option<String>,
    description: Option<String>,
    owner_id: Option<i64>,
    is_active: bool,
    visit_count: i64,
    last_visited_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(r: ShortLinkRow) -> Self {
        Self {
            id: r.id,
            slug: r.slug,
            original_url: r.original_url,
            title: r.title,
            description: r.description,
            owner_id: r.owner_id,
            is_active: r.is_active,
            visit_count: r.visit_count,
            last_visited_at: r.last_visited_at,
            expires_at: r.expires_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Escapes `LIKE` metacharacters and wraps the term for substring matching.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Postgres>, owner_id: i64, search: Option<&str>) {
    qb.push(" WHERE is_active AND owner_id = ").push_bind(owner_id);

    if let Some(search) = search {
        let pattern = like_pattern(search);
        qb.push(" AND (slug ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR original_url ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// PostgreSQL repository for short links.
///
/// Slug uniqueness is enforced by the partial unique index `short_links_active_slug_key`;
/// a violation surfaces as [`AppError::DuplicateSlug`] through `From<sqlx::Error>`.
pub struct PgShortLinkRepository {
    pool: Arc<PgPool>,
}

impl PgShortLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortLinkRepository for PgShortLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(concat!(
            "INSERT INTO short_links (slug, original_url, title, description, owner_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING ",
            link_columns!()
        ))
        .bind(new_link.slug)
        .bind(new_link.original_url)
        .bind(new_link.title)
        .bind(new_link.description)
        .bind(new_link.owner_id)
        .bind(new_link.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(concat!(
            "SELECT ",
            link_columns!(),
            " FROM short_links WHERE slug = $1 AND is_active"
        ))
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(
        &self,
        id: i64,
        owner_id: Option<i64>,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(concat!(
            "SELECT ",
            link_columns!(),
            " FROM short_links \
             WHERE id = $1 AND is_active AND ($2::BIGINT IS NULL OR owner_id = $2)"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM short_links
                WHERE slug = $1 AND is_active AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn record_visit(&self, id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE short_links
            SET visit_count = visit_count + 1, last_visited_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND is_active
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: ShortLinkPatch,
    ) -> Result<Option<ShortLink>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE short_links SET updated_at = NOW()");

        if let Some(slug) = patch.slug {
            qb.push(", slug = ").push_bind(slug);
        }
        if let Some(original_url) = patch.original_url {
            qb.push(", original_url = ").push_bind(original_url);
        }
        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(is_active) = patch.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        if let Some(expires_at) = patch.expires_at {
            qb.push(", expires_at = ").push_bind(expires_at);
        }

        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND owner_id = ")
            .push_bind(owner_id)
            .push(" AND is_active RETURNING ")
            .push(link_columns!());

        let row = qb
            .build_query_as::<ShortLinkRow>()
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        owner_id: i64,
        query: &LinkListQuery,
    ) -> Result<(Vec<ShortLink>, i64), AppError> {
        let search = query.search.as_deref();

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM short_links");
        push_list_filters(&mut count_qb, owner_id, search);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.as_ref())
            .await?;

        let mut qb =
            QueryBuilder::<Postgres>::new(concat!("SELECT ", link_columns!(), " FROM short_links"));
        push_list_filters(&mut qb, owner_id, search);
        qb.push(format!(
            " ORDER BY {} {} NULLS LAST, id DESC",
            query.sort_by.column(),
            query.sort_order.keyword()
        ));
        qb.push(" LIMIT ")
            .push_bind(query.page_size)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows = qb
            .build_query_as::<ShortLinkRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn owner_summary(&self, owner_id: i64) -> Result<OwnerSummary, AppError> {
        let (total_links, total_visits) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*)::BIGINT, COALESCE(SUM(visit_count), 0)::BIGINT
            FROM short_links
            WHERE owner_id = $1 AND is_active
            "#,
        )
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let top_links = sqlx::query_as::<_, ShortLinkRow>(concat!(
            "SELECT ",
            link_columns!(),
            " FROM short_links WHERE owner_id = $1 AND is_active \
             ORDER BY visit_count DESC, id DESC LIMIT $2"
        ))
        .bind(owner_id)
        .bind(SUMMARY_LIMIT)
        .fetch_all(self.pool.as_ref())
        .await?;

        let recent_links = sqlx::query_as::<_, ShortLinkRow>(concat!(
            "SELECT ",
            link_columns!(),
            " FROM short_links WHERE owner_id = $1 AND is_active \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(owner_id)
        .bind(SUMMARY_LIMIT)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(OwnerSummary {
            total_links,
            total_visits,
            top_links: top_links.into_iter().map(Into::into).collect(),
            recent_links: recent_links.into_iter().map(Into::into).collect(),
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
