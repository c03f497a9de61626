use anyhow::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// What a like toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Liked,
    Unliked,
}

/// Repository for the like relationship between an identity and a meme.
///
/// A toggle is the only write: it creates or removes the like row and moves
/// the meme's counter by exactly one, inside a single transaction. Either
/// both effects land or neither does.
#[derive(Clone)]
pub struct LikeRepository {
    pool: Pool<Postgres>,
}

impl LikeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn toggle(&self, meme_id: i64, identity_id: Uuid) -> Result<ToggleOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT meme_id FROM likes WHERE meme_id = $1 AND identity_id = $2 FOR UPDATE",
        )
        .bind(meme_id)
        .bind(identity_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = if existing.is_some() {
            sqlx::query("DELETE FROM likes WHERE meme_id = $1 AND identity_id = $2")
                .bind(meme_id)
                .bind(identity_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE memes SET likes = GREATEST(likes - 1, 0) WHERE id = $1")
                .bind(meme_id)
                .execute(&mut *tx)
                .await?;
            ToggleOutcome::Unliked
        } else {
            sqlx::query("INSERT INTO likes (meme_id, identity_id) VALUES ($1, $2)")
                .bind(meme_id)
                .bind(identity_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE memes SET likes = likes + 1 WHERE id = $1")
                .bind(meme_id)
                .execute(&mut *tx)
                .await?;
            ToggleOutcome::Liked
        };

        tx.commit().await?;
        Ok(outcome)
    }
}
