use crate::entities::{Category, Meme};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordering strategy for a feed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    /// Strict newest-first.
    Recency,
    /// Most-liked first, newer-first among ties.
    Popularity,
    /// Preference-partitioned with randomized exploration.
    #[default]
    Personalized,
}

/// Ephemeral feed request. An absent identity means an anonymous requester;
/// personalization degrades to a plain shuffle, never an error.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub identity: Option<Uuid>,
    pub category: Option<Category>,
    /// Case-insensitive substring matched against title or category label.
    pub text: Option<String>,
    pub mode: RankMode,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl FeedRequest {
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            category: None,
            text: None,
            mode: RankMode::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn for_identity(identity: Uuid) -> Self {
        Self {
            identity: Some(identity),
            ..Self::anonymous()
        }
    }

    /// Numeric offset of the first item on the requested page.
    pub fn offset(&self) -> usize {
        let page = self.page.max(1) as usize;
        (page - 1) * self.page_size as usize
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One feed entry as surfaced to consumers: the item, its public image URL,
/// and whether the requesting identity has an active like on it.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub likes: i32,
    pub image_url: String,
    pub liked: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FeedItem {
    pub fn from_meme(meme: &Meme, liked: bool) -> Self {
        Self {
            id: meme.id,
            title: meme.title.clone(),
            category: meme.category,
            likes: meme.likes,
            image_url: crate::blobs::public_url(&meme.blob_name),
            liked,
            created_at: meme.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_based() {
        let mut req = FeedRequest::anonymous();
        req.page_size = 10;
        req.page = 1;
        assert_eq!(req.offset(), 0);
        req.page = 3;
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let mut req = FeedRequest::anonymous();
        req.page = 0;
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn default_mode_is_personalized() {
        assert_eq!(RankMode::default(), RankMode::Personalized);
        assert_eq!(FeedRequest::anonymous().mode, RankMode::Personalized);
    }
}
