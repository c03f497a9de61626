use crate::ranking::ranker::{apply_text_filter, page_slice, rank};
use crate::ranking::request::{FeedItem, FeedRequest, RankMode};
use crate::repositories::items::MemeStore;
use anyhow::Result;
use rand::Rng;
use std::collections::HashSet;
use tracing::instrument;

/// How many liked categories count as an identity's preference set.
const TOP_CATEGORY_COUNT: i64 = 3;

/// Read-only feed assembly: deterministic filtered fetch from the store,
/// explicit ranking, then paging and per-item like flags. No write side
/// effects anywhere on this path.
pub struct FeedService<'a> {
    store: &'a dyn MemeStore,
}

impl<'a> FeedService<'a> {
    pub fn new(store: &'a dyn MemeStore) -> Self {
        Self { store }
    }

    /// Produce one page for the request. Missing identity or empty
    /// interaction history degrade to randomized ordering; they never fail
    /// the request.
    #[instrument(skip_all, fields(mode = ?request.mode, page = request.page))]
    pub async fn feed<R: Rng>(&self, request: &FeedRequest, rng: &mut R) -> Result<Vec<FeedItem>> {
        let mut memes = self.store.list_active(request.category).await?;

        if let Some(text) = request.text.as_deref() {
            memes = apply_text_filter(memes, text);
        }

        let preferred = match (request.mode, request.identity) {
            (RankMode::Personalized, Some(identity)) => {
                self.store.top_categories(identity, TOP_CATEGORY_COUNT).await?
            }
            _ => Vec::new(),
        };

        rank(&mut memes, request.mode, &preferred, rng);

        let page = page_slice(memes, request.offset(), request.page_size as usize);

        let liked: HashSet<i64> = match request.identity {
            Some(identity) if !page.is_empty() => {
                let ids: Vec<i64> = page.iter().map(|m| m.id).collect();
                self.store.liked_meme_ids(identity, &ids).await?
            }
            _ => HashSet::new(),
        };

        Ok(page
            .iter()
            .map(|meme| FeedItem::from_meme(meme, liked.contains(&meme.id)))
            .collect())
    }
}
