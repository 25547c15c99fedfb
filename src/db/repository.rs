//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. Entity
//! specific queries live in the sibling modules as further `impl Repository`
//! blocks.

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::RevisionInfo;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }
}

/// Increment the revision counter on an open connection or transaction.
pub(super) async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(conn)
        .await?;
    Ok(())
}

/// Fail with [`AppError::NotFound`] unless `id` exists in `table`.
pub(super) async fn ensure_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    label: &str,
    id: &str,
) -> Result<(), AppError> {
    let found = sqlx::query(&format!("SELECT 1 FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("{} {} not found", label, id))),
    }
}

/// Case-insensitive substring match of `query` against any of `fields`.
///
/// Done in Rust because SQLite's `lower()` and `LIKE` only fold ASCII.
pub(super) fn matches_query(query: Option<&str>, fields: &[Option<&str>]) -> bool {
    let needle = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => q.to_lowercase(),
        None => return true,
    };
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_query_is_unicode_case_insensitive() {
        assert!(matches_query(None, &[Some("Иванов")]));
        assert!(matches_query(Some("  "), &[]));
        assert!(matches_query(Some("иван"), &[Some("Иванов")]));
        assert!(matches_query(Some("555"), &[None, Some("0555 123")]));
        assert!(!matches_query(Some("петр"), &[Some("Иванов"), None]));
    }

    #[tokio::test]
    async fn test_revision_increments() {
        let (repo, _dir) = test_support::repository().await;
        let initial = repo.get_revision_id().await.unwrap();
        let mut conn = repo.pool.acquire().await.unwrap();
        bump_revision(&mut conn).await.unwrap();
        let next = repo.get_revision_id().await.unwrap();
        assert_eq!(next, initial + 1);
        assert_eq!(repo.get_revision_info().await.unwrap().revision_id, next);
    }
}
