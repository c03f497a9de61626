//! In-memory fakes for the store and blob seams, used by unit tests here
//! and by the integration tests via the `test-support` feature.

use crate::blobs::BlobStore;
use crate::entities::{Category, Like, Meme, NewMeme};
use crate::repositories::items::{InsertOutcome, MemeStore};
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use uuid::Uuid;

/// In-memory [`MemeStore`] with the same fingerprint uniqueness guarantee as
/// the Postgres schema. Ids are assigned monotonically and never reused.
#[derive(Default)]
pub struct MemoryMemeStore {
    memes: Mutex<Vec<Meme>>,
    likes: Mutex<Vec<Like>>,
    next_id: AtomicI64,
    fail_next_insert: AtomicBool,
    fail_next_delete: AtomicBool,
}

impl MemoryMemeStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.memes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all rows, in insertion order.
    pub fn snapshot(&self) -> Vec<Meme> {
        self.memes.lock().unwrap().clone()
    }

    /// Insert bypassing the fingerprint constraint, for seeding the
    /// pre-constraint duplicates the reconciler exists to clean up.
    pub fn seed_unchecked(&self, new: NewMeme) -> Meme {
        self.push_row(new, Utc::now())
    }

    /// Insert bypassing the constraint with an explicit creation timestamp,
    /// for ranking tests that need a known recency order.
    pub fn seed_at(&self, new: NewMeme, created_at: DateTime<Utc>) -> Meme {
        self.push_row(new, created_at)
    }

    /// Record a like without touching counters, for preference seeding.
    pub fn seed_like(&self, meme_id: i64, identity_id: Uuid) {
        self.likes.lock().unwrap().push(Like {
            meme_id,
            identity_id,
            created_at: Utc::now(),
        });
    }

    /// Make the next insert fail, to exercise skip-and-continue paths.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Make the next delete fail.
    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    fn push_row(&self, new: NewMeme, created_at: DateTime<Utc>) -> Meme {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let meme = Meme {
            id,
            title: new.title,
            category: new.category,
            likes: new.likes,
            fingerprint: new.fingerprint,
            blob_name: new.blob_name,
            owner_id: new.owner_id,
            created_at,
        };
        self.memes.lock().unwrap().push(meme.clone());
        meme
    }
}

#[async_trait]
impl MemeStore for MemoryMemeStore {
    async fn insert(&self, new: NewMeme) -> Result<InsertOutcome> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            bail!("injected insert failure");
        }
        {
            let memes = self.memes.lock().unwrap();
            if memes.iter().any(|m| m.fingerprint == new.fingerprint) {
                return Ok(InsertOutcome::DuplicateFingerprint);
            }
        }
        Ok(InsertOutcome::Inserted(self.push_row(new, Utc::now())))
    }

    async fn is_duplicate(&self, fingerprint: &str, title: &str) -> Result<bool> {
        let memes = self.memes.lock().unwrap();
        Ok(memes
            .iter()
            .any(|m| m.fingerprint == fingerprint || m.title == title))
    }

    async fn list_active(&self, category: Option<Category>) -> Result<Vec<Meme>> {
        let memes = self.memes.lock().unwrap();
        Ok(memes
            .iter()
            .filter(|m| category.is_none_or(|c| m.category == c))
            .cloned()
            .collect())
    }

    async fn duplicate_rows(&self) -> Result<Vec<Meme>> {
        let memes = self.memes.lock().unwrap();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for meme in memes.iter() {
            *counts.entry(meme.fingerprint.as_str()).or_default() += 1;
        }
        let mut rows: Vec<Meme> = memes
            .iter()
            .filter(|m| counts[m.fingerprint.as_str()] > 1)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            bail!("injected delete failure");
        }
        let mut memes = self.memes.lock().unwrap();
        let before = memes.len();
        memes.retain(|m| m.id != id);
        Ok(memes.len() < before)
    }

    async fn top_categories(&self, identity_id: Uuid, limit: i64) -> Result<Vec<Category>> {
        let likes = self.likes.lock().unwrap();
        let memes = self.memes.lock().unwrap();

        // BTreeMap keyed by category gives the deterministic declaration-order
        // tie-break the Postgres query has.
        let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
        for like in likes.iter().filter(|l| l.identity_id == identity_id) {
            if let Some(meme) = memes.iter().find(|m| m.id == like.meme_id) {
                *counts.entry(meme.category).or_default() += 1;
            }
        }

        let mut ranked: Vec<(Category, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(category, _)| category)
            .collect())
    }

    async fn liked_meme_ids(&self, identity_id: Uuid, meme_ids: &[i64]) -> Result<HashSet<i64>> {
        let likes = self.likes.lock().unwrap();
        Ok(likes
            .iter()
            .filter(|l| l.identity_id == identity_id && meme_ids.contains(&l.meme_id))
            .map(|l| l.meme_id)
            .collect())
    }
}

/// In-memory [`BlobStore`].
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(name)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.blobs.lock().unwrap().remove(name);
        Ok(())
    }
}
