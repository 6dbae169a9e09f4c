/// Name of the partial unique index guarding active slugs.
pub const ACTIVE_SLUG_CONSTRAINT: &str = "short_links_active_slug_key";

/// True when the database rejected a write because another active link holds the slug.
pub fn is_unique_violation_on_slug(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(ACTIVE_SLUG_CONSTRAINT))
}
