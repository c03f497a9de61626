use crate::source::{errors::FetchError, types::{Candidate, ListingResponse}};
use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::instrument;
use url::Url;

const MAX_BLOB_SIZE: u64 = 10 * 1024 * 1024; // 10MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = "MemefetchBot/0.1 (+https://memefetch.example.com)";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(5))
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

/// Outbound boundary to the meme source. Implemented over HTTP in production
/// and mocked in driver tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemeSource: Send + Sync {
    /// List a batch of candidates for a topic. Transient failure is reported
    /// as a batch failure, never a panic or process abort.
    async fn list(&self, topic: &str, batch_size: u32) -> Result<Vec<Candidate>, FetchError>;

    /// Download one candidate's backing blob. Failure skips that candidate
    /// only, not the whole batch.
    async fn download(&self, image_url: &str) -> Result<Bytes, FetchError>;
}

/// HTTP implementation against a `meme-api`-style endpoint:
/// `GET {base}/gimme/{topic}/{batch_size}` returning `{ "memes": [...] }`.
pub struct HttpMemeSource {
    base: Url,
}

impl HttpMemeSource {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    fn listing_url(&self, topic: &str, batch_size: u32) -> Result<Url, FetchError> {
        let path = format!("gimme/{}/{}", topic, batch_size);
        Ok(self.base.join(&path)?)
    }
}

#[async_trait]
impl MemeSource for HttpMemeSource {
    #[instrument(skip_all, fields(topic = %topic, batch_size))]
    async fn list(&self, topic: &str, batch_size: u32) -> Result<Vec<Candidate>, FetchError> {
        let url = self.listing_url(topic, batch_size)?;

        let response = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                retriable: status.is_server_error(),
            });
        }

        let listing: ListingResponse = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

        Ok(listing.memes)
    }

    #[instrument(skip_all, fields(url = %image_url))]
    async fn download(&self, image_url: &str) -> Result<Bytes, FetchError> {
        let url = Url::parse(image_url)?;

        let response = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                retriable: status.is_server_error(),
            });
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BLOB_SIZE
        {
            return Err(FetchError::Io(format!(
                "blob too large ({content_length} bytes)"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        if body.len() as u64 > MAX_BLOB_SIZE {
            return Err(FetchError::Io(format!("blob too large ({} bytes)", body.len())));
        }

        Ok(body)
    }
}
