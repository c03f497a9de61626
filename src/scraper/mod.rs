pub mod driver;
pub mod reconciler;

pub use driver::{ScrapeConfig, ScrapeDriver, ScrapeReport};
pub use reconciler::DuplicateReconciler;
