//! Static source-topic → display-category map.
//!
//! Fixed at deploy time and deliberately small; topics the map does not know
//! fall back to [`Category::General`].

use crate::entities::Category;
use rand::Rng;
use rand::seq::SliceRandom;

/// Source topic keys paired with the category their memes are filed under.
pub const TOPIC_MAP: &[(&str, Category)] = &[
    ("memes", Category::Funny),
    ("funny", Category::Funny),
    ("dankmemes", Category::DarkHumor),
    ("wholesomememes", Category::Relatable),
    ("me_irl", Category::Relatable),
    ("meirl", Category::Relatable),
    ("2meirl4meirl", Category::Relatable),
    ("programmerhumor", Category::WorkLife),
    ("anime_irl", Category::Anime),
    ("animemes", Category::Anime),
    ("goodanimemes", Category::Anime),
    ("historymemes", Category::Other),
    ("sciencememes", Category::Other),
    ("surrealmemes", Category::DarkHumor),
    ("terriblefacebookmemes", Category::Funny),
    ("PrequelMemes", Category::Funny),
    ("AdviceAnimals", Category::Other),
];

/// Map a source topic key to its display category, defaulting to `General`.
pub fn category_for(source_topic: &str) -> Category {
    TOPIC_MAP
        .iter()
        .find(|(key, _)| *key == source_topic)
        .map(|(_, category)| *category)
        .unwrap_or(Category::General)
}

/// Pick a topic key uniformly at random for the next acquisition attempt.
pub fn random_topic<R: Rng>(rng: &mut R) -> &'static str {
    // TOPIC_MAP is a non-empty constant, so choose() cannot fail.
    TOPIC_MAP.choose(rng).map(|(key, _)| *key).unwrap_or("memes")
}
