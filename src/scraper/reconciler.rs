use crate::blobs::BlobStore;
use crate::repositories::items::MemeStore;
use anyhow::Result;
use tracing::{info, warn};

/// Maintenance pass that collapses fingerprint duplicates left behind by
/// races or pre-constraint data. For every fingerprint held by more than one
/// row, the row with the smallest id survives; the rest lose their row and,
/// best-effort, their backing blob. Safe to run repeatedly and next to
/// concurrent readers: ids are never reused, so a reader can at worst see a
/// duplicate a moment before it disappears.
pub struct DuplicateReconciler<'a> {
    store: &'a dyn MemeStore,
    blobs: &'a dyn BlobStore,
}

impl<'a> DuplicateReconciler<'a> {
    pub fn new(store: &'a dyn MemeStore, blobs: &'a dyn BlobStore) -> Self {
        Self { store, blobs }
    }

    /// Run one pass. Returns the number of rows removed. A delete failure
    /// for one group member is skip-and-continue; only the initial scan can
    /// fail the pass as a whole.
    pub async fn run(&self) -> Result<u32> {
        let rows = self.store.duplicate_rows().await?;

        let mut removed = 0u32;
        let mut keeper: Option<String> = None;

        // Rows arrive ordered by (fingerprint, id); the first row of each
        // group is the survivor.
        for meme in rows {
            if keeper.as_deref() != Some(meme.fingerprint.as_str()) {
                keeper = Some(meme.fingerprint.clone());
                continue;
            }

            match self.store.delete(meme.id).await {
                Ok(true) => {
                    removed += 1;
                    if let Err(e) = self.blobs.delete(&meme.blob_name).await {
                        warn!(id = meme.id, blob = %meme.blob_name, error = %e,
                            "failed to delete duplicate blob");
                    }
                }
                Ok(false) => {
                    // Already gone, e.g. removed by a concurrent pass.
                }
                Err(e) => {
                    warn!(id = meme.id, error = %e, "failed to delete duplicate row, continuing");
                }
            }
        }

        info!(removed, "duplicate reconciliation finished");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Category, NewMeme};
    use crate::testing::{MemoryBlobStore, MemoryMemeStore};
    use uuid::Uuid;

    fn new_meme(title: &str, fingerprint: &str, blob: &str) -> NewMeme {
        NewMeme {
            title: title.to_string(),
            category: Category::Funny,
            likes: 0,
            fingerprint: fingerprint.to_string(),
            blob_name: blob.to_string(),
            owner_id: Uuid::new_v4(),
        }
    }

    /// The memory store enforces the fingerprint constraint the way Postgres
    /// does, so duplicates have to be seeded behind its back.
    async fn seed_duplicates(store: &MemoryMemeStore, blobs: &MemoryBlobStore) {
        for (title, fp, blob) in [
            ("one", "aaa", "one.jpg"),
            ("two", "bbb", "two.jpg"),
            ("one again", "aaa", "one-again.jpg"),
            ("one more", "aaa", "one-more.jpg"),
            ("two again", "bbb", "two-again.jpg"),
        ] {
            store.seed_unchecked(new_meme(title, fp, blob));
            blobs.write(blob, b"bytes").await.unwrap();
        }
    }

    #[tokio::test]
    async fn keeps_smallest_id_per_group() {
        let store = MemoryMemeStore::new();
        let blobs = MemoryBlobStore::new();
        seed_duplicates(&store, &blobs).await;

        let reconciler = DuplicateReconciler::new(&store, &blobs);
        let removed = reconciler.run().await.unwrap();

        assert_eq!(removed, 3);
        let survivors = store.snapshot();
        assert_eq!(survivors.len(), 2);
        // ids 1 and 2 were the first of their groups
        assert!(survivors.iter().any(|m| m.id == 1 && m.fingerprint == "aaa"));
        assert!(survivors.iter().any(|m| m.id == 2 && m.fingerprint == "bbb"));
    }

    #[tokio::test]
    async fn removes_backing_blobs_of_losers() {
        let store = MemoryMemeStore::new();
        let blobs = MemoryBlobStore::new();
        seed_duplicates(&store, &blobs).await;

        DuplicateReconciler::new(&store, &blobs).run().await.unwrap();

        assert!(blobs.contains("one.jpg"));
        assert!(blobs.contains("two.jpg"));
        assert!(!blobs.contains("one-again.jpg"));
        assert!(!blobs.contains("one-more.jpg"));
        assert!(!blobs.contains("two-again.jpg"));
    }

    #[tokio::test]
    async fn second_run_is_a_noop() {
        let store = MemoryMemeStore::new();
        let blobs = MemoryBlobStore::new();
        seed_duplicates(&store, &blobs).await;

        let reconciler = DuplicateReconciler::new(&store, &blobs);
        let first = reconciler.run().await.unwrap();
        let second = reconciler.run().await.unwrap();

        assert_eq!(first, 3);
        assert_eq!(second, 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn missing_blob_does_not_fail_the_pass() {
        let store = MemoryMemeStore::new();
        let blobs = MemoryBlobStore::new();
        // Rows only, no blobs at all.
        store.seed_unchecked(new_meme("one", "aaa", "one.jpg"));
        store.seed_unchecked(new_meme("one again", "aaa", "one-again.jpg"));

        let removed = DuplicateReconciler::new(&store, &blobs).run().await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn clean_store_removes_nothing() {
        let store = MemoryMemeStore::new();
        let blobs = MemoryBlobStore::new();
        store.seed_unchecked(new_meme("one", "aaa", "one.jpg"));
        store.seed_unchecked(new_meme("two", "bbb", "two.jpg"));

        let removed = DuplicateReconciler::new(&store, &blobs).run().await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn delete_failure_skips_member_and_continues() {
        let store = MemoryMemeStore::new();
        let blobs = MemoryBlobStore::new();
        seed_duplicates(&store, &blobs).await;
        // First delete attempt errors; the pass keeps going.
        store.fail_next_delete();

        let removed = DuplicateReconciler::new(&store, &blobs).run().await.unwrap();
        assert_eq!(removed, 2);
    }
}
