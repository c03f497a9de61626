pub mod client;
pub mod errors;
pub mod types;

pub use client::{HttpMemeSource, MemeSource};
pub use errors::FetchError;
pub use types::{Candidate, ListingResponse};

#[cfg(test)]
pub use client::MockMemeSource;
