use crate::blobs::{BlobStore, generate_blob_name};
use crate::entities::NewMeme;
use crate::fingerprint::fingerprint;
use crate::repositories::items::{InsertOutcome, MemeStore};
use crate::source::{Candidate, MemeSource};
use crate::topics;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Bounds and knobs for one acquisition run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Newly accepted memes to aim for.
    pub target_accepted: u32,
    /// Batch attempts allowed before giving up.
    pub max_attempts: u32,
    /// Candidates requested per batch.
    pub batch_size: u32,
    /// Pause after every attempt, success or failure.
    pub cooldown: Duration,
    /// Identity that owns ingested memes.
    pub owner_id: Uuid,
}

/// Aggregate outcome of an acquisition run. A shortfall (`accepted` below
/// target with the attempt budget spent) is a normal outcome, not an error.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub accepted: u32,
    pub attempts: u32,
    pub failed_batches: u32,
    pub skipped_nsfw: u32,
    pub skipped_duplicate: u32,
    pub skipped_download: u32,
    pub store_errors: u32,
}

impl ScrapeReport {
    /// Whether the run reached its target before exhausting attempts.
    pub fn reached_target(&self, config: &ScrapeConfig) -> bool {
        self.accepted >= config.target_accepted
    }
}

/// Sequential, single-flow acquisition loop. One batch fetch at a time, one
/// candidate at a time, a cooldown between attempts; no overlap. The
/// fingerprint unique index at the store closes the duplicate race between
/// concurrent runs, and the reconciler cleans up anything older.
pub struct ScrapeDriver<'a> {
    source: &'a dyn MemeSource,
    store: &'a dyn MemeStore,
    blobs: &'a dyn BlobStore,
    config: ScrapeConfig,
}

impl<'a> ScrapeDriver<'a> {
    pub fn new(
        source: &'a dyn MemeSource,
        store: &'a dyn MemeStore,
        blobs: &'a dyn BlobStore,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            source,
            store,
            blobs,
            config,
        }
    }

    /// Run the loop to completion. Terminates once the target is reached or
    /// the attempt budget is spent, whichever comes first.
    pub async fn run<R: Rng>(&self, rng: &mut R) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        while report.accepted < self.config.target_accepted
            && report.attempts < self.config.max_attempts
        {
            report.attempts += 1;
            let topic = topics::random_topic(rng);
            info!(attempt = report.attempts, topic, "starting batch");

            match self.source.list(topic, self.config.batch_size).await {
                Ok(batch) => {
                    self.process_batch(batch, &mut report).await;
                }
                Err(e) => {
                    report.failed_batches += 1;
                    warn!(topic, error = %e, "batch fetch failed, moving on");
                }
            }

            // Rate-limit courtesy toward the source.
            tokio::time::sleep(self.config.cooldown).await;
        }

        info!(
            accepted = report.accepted,
            attempts = report.attempts,
            failed_batches = report.failed_batches,
            "acquisition run finished"
        );
        report
    }

    async fn process_batch(&self, batch: Vec<Candidate>, report: &mut ScrapeReport) {
        for candidate in batch {
            if report.accepted >= self.config.target_accepted {
                break;
            }
            self.process_candidate(candidate, report).await;
        }
    }

    /// Accept/reject policy for a single candidate. Rejections are silent
    /// skips counted for observability, never errors.
    async fn process_candidate(&self, candidate: Candidate, report: &mut ScrapeReport) {
        if candidate.nsfw {
            report.skipped_nsfw += 1;
            return;
        }

        let blob = match self.source.download(&candidate.image_url).await {
            Ok(blob) => blob,
            Err(e) => {
                report.skipped_download += 1;
                warn!(url = %candidate.image_url, error = %e, "blob download failed, skipping");
                return;
            }
        };

        let digest = fingerprint(&blob);

        // Combined content+metadata duplicate guard: an existing fingerprint
        // or an existing identical title both reject the candidate.
        match self.store.is_duplicate(&digest, &candidate.title).await {
            Ok(true) => {
                report.skipped_duplicate += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                report.store_errors += 1;
                warn!(error = %e, "duplicate check failed, skipping candidate");
                return;
            }
        }

        let blob_name = generate_blob_name(&candidate.image_url);
        if let Err(e) = self.blobs.write(&blob_name, &blob).await {
            report.store_errors += 1;
            warn!(blob_name, error = %e, "blob write failed, skipping candidate");
            return;
        }

        let new = NewMeme {
            title: candidate.title.clone(),
            category: topics::category_for(&candidate.source_topic),
            likes: candidate.upstream_ups.max(0),
            fingerprint: digest,
            blob_name: blob_name.clone(),
            owner_id: self.config.owner_id,
        };

        match self.store.insert(new).await {
            Ok(InsertOutcome::Inserted(meme)) => {
                report.accepted += 1;
                info!(
                    id = meme.id,
                    accepted = report.accepted,
                    target = self.config.target_accepted,
                    title = %truncate(&meme.title, 40),
                    "accepted meme"
                );
            }
            Ok(InsertOutcome::DuplicateFingerprint) => {
                // Lost a race with a concurrent run; the blob we wrote is now
                // orphaned, so drop it.
                report.skipped_duplicate += 1;
                if let Err(e) = self.blobs.delete(&blob_name).await {
                    warn!(blob_name, error = %e, "failed to remove orphaned blob");
                }
            }
            Err(e) => {
                report.store_errors += 1;
                warn!(error = %e, "insert failed, skipping candidate");
                if let Err(e) = self.blobs.delete(&blob_name).await {
                    warn!(blob_name, error = %e, "failed to remove orphaned blob");
                }
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
