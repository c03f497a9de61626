use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// --- PostgreSQL Enums ---

/// Display category a meme is filed under. Source topics map onto this via
/// the static topic map; unmapped topics land in `General`.
#[derive(
    sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[sqlx(type_name = "meme_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Funny,
    DarkHumor,
    Relatable,
    WorkLife,
    Anime,
    Other,
    General,
}

impl Category {
    /// Human-readable label, used for case-insensitive text filtering.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Funny => "Funny",
            Category::DarkHumor => "Dark Humor",
            Category::Relatable => "Relatable",
            Category::WorkLife => "Work Life",
            Category::Anime => "Anime",
            Category::Other => "Other",
            Category::General => "General",
        }
    }
}

/// --- Tables ---

#[derive(Debug, Clone, FromRow)]
pub struct Meme {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub likes: i32,
    pub fingerprint: String,
    pub blob_name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A like relationship. Created and deleted by the toggle, never updated.
#[derive(Debug, Clone, FromRow)]
pub struct Like {
    pub meme_id: i64,
    pub identity_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Column values for a meme about to be inserted; the store assigns the id
/// and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewMeme {
    pub title: String,
    pub category: Category,
    pub likes: i32,
    pub fingerprint: String,
    pub blob_name: String,
    pub owner_id: Uuid,
}
