pub mod interactions;
pub mod items;

pub use interactions::{LikeRepository, ToggleOutcome};
pub use items::{InsertOutcome, MemeStore, PgMemeStore};
