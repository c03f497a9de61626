use crate::entities::{Category, Meme, NewMeme};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::collections::HashSet;
use uuid::Uuid;

/// Outcome of an insert attempt. The fingerprint column carries a unique
/// index, so a conflicting insert is the duplicate signal itself; there is
/// no race window between check and insert.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(Meme),
    DuplicateFingerprint,
}

/// Persisted-store boundary consumed by the acquisition driver, the
/// reconciler, and the feed service.
#[async_trait]
pub trait MemeStore: Send + Sync {
    /// Insert a new meme. A fingerprint conflict resolves to
    /// [`InsertOutcome::DuplicateFingerprint`], not an error.
    async fn insert(&self, new: NewMeme) -> Result<InsertOutcome>;

    /// Whether an active meme already carries this fingerprint or this exact
    /// title. Title matching is a soft duplicate signal during ingestion.
    async fn is_duplicate(&self, fingerprint: &str, title: &str) -> Result<bool>;

    /// All active memes, optionally narrowed to one category. Unordered;
    /// ordering is the ranker's job.
    async fn list_active(&self, category: Option<Category>) -> Result<Vec<Meme>>;

    /// Rows whose fingerprint occurs more than once, ordered by
    /// (fingerprint, id) so callers can group by adjacency.
    async fn duplicate_rows(&self) -> Result<Vec<Meme>>;

    /// Delete one meme row. Returns false when the id no longer exists.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// The identity's most-liked categories, most-liked first, at most
    /// `limit` entries. Count ties break on category declaration order so
    /// the result is deterministic.
    async fn top_categories(&self, identity_id: Uuid, limit: i64) -> Result<Vec<Category>>;

    /// Which of the given memes the identity has an active like on.
    async fn liked_meme_ids(&self, identity_id: Uuid, meme_ids: &[i64]) -> Result<HashSet<i64>>;
}

#[derive(Clone)]
pub struct PgMemeStore {
    pool: Pool<Postgres>,
}

impl PgMemeStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemeStore for PgMemeStore {
    async fn insert(&self, new: NewMeme) -> Result<InsertOutcome> {
        let inserted = sqlx::query_as::<_, Meme>(
            r#"
            INSERT INTO memes (title, category, likes, fingerprint, blob_name, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (fingerprint) DO NOTHING
            RETURNING id, title, category, likes, fingerprint, blob_name, owner_id, created_at
            "#,
        )
        .bind(&new.title)
        .bind(new.category)
        .bind(new.likes)
        .bind(&new.fingerprint)
        .bind(&new.blob_name)
        .bind(new.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(meme) => InsertOutcome::Inserted(meme),
            None => InsertOutcome::DuplicateFingerprint,
        })
    }

    async fn is_duplicate(&self, fingerprint: &str, title: &str) -> Result<bool> {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM memes WHERE fingerprint = $1 OR title = $2 LIMIT 1",
        )
        .bind(fingerprint)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(existing.is_some())
    }

    async fn list_active(&self, category: Option<Category>) -> Result<Vec<Meme>> {
        let memes = match category {
            Some(category) => {
                sqlx::query_as::<_, Meme>(
                    r#"
                    SELECT id, title, category, likes, fingerprint, blob_name, owner_id, created_at
                    FROM memes
                    WHERE category = $1
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Meme>(
                    r#"
                    SELECT id, title, category, likes, fingerprint, blob_name, owner_id, created_at
                    FROM memes
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(memes)
    }

    async fn duplicate_rows(&self) -> Result<Vec<Meme>> {
        let memes = sqlx::query_as::<_, Meme>(
            r#"
            SELECT id, title, category, likes, fingerprint, blob_name, owner_id, created_at
            FROM memes
            WHERE fingerprint IN (
                SELECT fingerprint FROM memes GROUP BY fingerprint HAVING COUNT(*) > 1
            )
            ORDER BY fingerprint, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(memes)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM memes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn top_categories(&self, identity_id: Uuid, limit: i64) -> Result<Vec<Category>> {
        let categories: Vec<Category> = sqlx::query_scalar(
            r#"
            SELECT m.category
            FROM likes l
            JOIN memes m ON m.id = l.meme_id
            WHERE l.identity_id = $1
            GROUP BY m.category
            ORDER BY COUNT(*) DESC, m.category ASC
            LIMIT $2
            "#,
        )
        .bind(identity_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn liked_meme_ids(&self, identity_id: Uuid, meme_ids: &[i64]) -> Result<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT meme_id FROM likes WHERE identity_id = $1 AND meme_id = ANY($2)",
        )
        .bind(identity_id)
        .bind(meme_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
