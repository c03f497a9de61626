pub mod blobs;
pub mod config;
pub mod entities;
pub mod fingerprint;
pub mod ranking;
pub mod repositories;
pub mod scraper;
pub mod source;
pub mod topics;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
