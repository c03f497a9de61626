pub mod ranker;
pub mod request;
pub mod service;

pub use ranker::{apply_text_filter, page_slice, rank};
pub use request::{DEFAULT_PAGE_SIZE, FeedItem, FeedRequest, RankMode};
pub use service::FeedService;
