//! PostgreSQL implementation of the click log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    ip_address: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    clicked_at: DateTime<Utc>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Self {
            id: r.id,
            link_id: r.link_id,
            ip_address: r.ip_address,
            user_agent: r.user_agent,
            referer: r.referer,
            clicked_at: r.clicked_at,
        }
    }
}

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO clicks (link_id, ip_address, user_agent, referer, clicked_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, link_id, ip_address, user_agent, referer, clicked_at
            "#,
        )
        .bind(click.link_id)
        .bind(click.ip_address)
        .bind(click.user_agent)
        .bind(click.referer)
        .bind(click.clicked_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn recent_for_link(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, link_id, ip_address, user_agent, referer, clicked_at
            FROM clicks
            WHERE link_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
