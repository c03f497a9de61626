//! Pure ordering logic over an already-filtered candidate set.
//!
//! Randomness is injected so callers can seed it; production draws a fresh
//! rng per request, tests pass a fixed seed and get reproducible orders.

use crate::entities::{Category, Meme};
use crate::ranking::request::RankMode;
use rand::Rng;
use rand::seq::SliceRandom;

/// Case-insensitive text filter against title or category label. Applied
/// before ranking and before paging.
pub fn apply_text_filter(memes: Vec<Meme>, text: &str) -> Vec<Meme> {
    let needle = text.to_lowercase();
    if needle.is_empty() {
        return memes;
    }
    memes
        .into_iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&needle)
                || m.category.label().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Order the candidate set in place according to the requested mode.
///
/// `preferred` is the requesting identity's top liked categories; it is only
/// consulted in `Personalized` mode and may be empty (anonymous requester or
/// no interaction history), in which case the order is one uniform shuffle.
pub fn rank<R: Rng>(memes: &mut Vec<Meme>, mode: RankMode, preferred: &[Category], rng: &mut R) {
    match mode {
        RankMode::Recency => {
            memes.sort_unstable_by(|a, b| {
                b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
            });
        }
        RankMode::Popularity => {
            // Likes descending; equal popularity breaks toward the newer
            // item, id as the final deterministic tie-break.
            memes.sort_unstable_by(|a, b| {
                b.likes
                    .cmp(&a.likes)
                    .then(b.created_at.cmp(&a.created_at))
                    .then(b.id.cmp(&a.id))
            });
        }
        RankMode::Personalized => {
            if preferred.is_empty() {
                memes.shuffle(rng);
                return;
            }
            // Binary partition: preferred-topic items strictly before the
            // rest, each side shuffled independently.
            let (mut liked_topics, mut rest): (Vec<Meme>, Vec<Meme>) = memes
                .drain(..)
                .partition(|m| preferred.contains(&m.category));
            liked_topics.shuffle(rng);
            rest.shuffle(rng);
            memes.extend(liked_topics);
            memes.extend(rest);
        }
    }
}

/// Cut one page out of the ranked set. Pages past the end are empty.
pub fn page_slice(memes: Vec<Meme>, offset: usize, page_size: usize) -> Vec<Meme> {
    memes.into_iter().skip(offset).take(page_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    fn meme(id: i64, title: &str, category: Category, likes: i32, age_secs: i64) -> Meme {
        Meme {
            id,
            title: title.to_string(),
            category,
            likes,
            fingerprint: format!("fp-{id}"),
            blob_name: format!("{id}.jpg"),
            owner_id: Uuid::nil(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn recency_is_newest_first() {
        let mut memes = vec![
            meme(1, "oldest", Category::Funny, 0, 300),
            meme(2, "newest", Category::Funny, 0, 100),
            meme(3, "middle", Category::Funny, 0, 200),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        rank(&mut memes, RankMode::Recency, &[], &mut rng);
        let ids: Vec<i64> = memes.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn popularity_ties_break_newer_first() {
        // likes [5,1,5,3] in creation order t1..t4: the tied 5s order
        // newer-first, so item3 comes before item1.
        let mut memes = vec![
            meme(1, "item1", Category::Funny, 5, 400),
            meme(2, "item2", Category::Funny, 1, 300),
            meme(3, "item3", Category::Funny, 5, 200),
            meme(4, "item4", Category::Funny, 3, 100),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        rank(&mut memes, RankMode::Popularity, &[], &mut rng);
        let ids: Vec<i64> = memes.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[test]
    fn personalized_partitions_preferred_topics_first_for_all_seeds() {
        let preferred = [Category::Anime, Category::Funny, Category::Relatable];
        for seed in 0..50 {
            let mut memes = vec![
                meme(1, "a", Category::Anime, 0, 1),
                meme(2, "d", Category::DarkHumor, 0, 2),
                meme(3, "f", Category::Funny, 0, 3),
                meme(4, "d2", Category::DarkHumor, 0, 4),
                meme(5, "a2", Category::Anime, 0, 5),
            ];
            let mut rng = StdRng::seed_from_u64(seed);
            rank(&mut memes, RankMode::Personalized, &preferred, &mut rng);

            let boundary = memes
                .iter()
                .position(|m| !preferred.contains(&m.category))
                .unwrap();
            assert!(
                memes[boundary..].iter().all(|m| !preferred.contains(&m.category)),
                "seed {seed}: non-preferred item before a preferred one"
            );
            assert_eq!(boundary, 3);
            assert_eq!(memes.len(), 5);
        }
    }

    #[test]
    fn personalized_without_history_shuffles_everything() {
        let original: Vec<Meme> = (1..=8)
            .map(|id| meme(id, "m", Category::Funny, 0, id))
            .collect();

        let mut memes = original.clone();
        let mut rng = StdRng::seed_from_u64(11);
        rank(&mut memes, RankMode::Personalized, &[], &mut rng);

        // Same multiset, order free to differ between requests.
        let mut ids: Vec<i64> = memes.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<i64>>());

        // Across a spread of seeds, at least one order deviates from the
        // input order, i.e. the shuffle actually moves things.
        let input_order: Vec<i64> = original.iter().map(|m| m.id).collect();
        let any_moved = (0..20).any(|seed| {
            let mut shuffled = original.clone();
            rank(
                &mut shuffled,
                RankMode::Personalized,
                &[],
                &mut StdRng::seed_from_u64(seed),
            );
            shuffled.iter().map(|m| m.id).collect::<Vec<_>>() != input_order
        });
        assert!(any_moved);
    }

    #[test]
    fn seeded_rng_makes_shuffle_reproducible() {
        let build = || -> Vec<Meme> {
            (1..=10).map(|id| meme(id, "m", Category::Funny, 0, id)).collect()
        };
        let mut first = build();
        let mut second = build();
        rank(&mut first, RankMode::Personalized, &[], &mut StdRng::seed_from_u64(42));
        rank(&mut second, RankMode::Personalized, &[], &mut StdRng::seed_from_u64(42));
        assert_eq!(
            first.iter().map(|m| m.id).collect::<Vec<_>>(),
            second.iter().map(|m| m.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn text_filter_matches_title_case_insensitive() {
        let memes = vec![
            meme(1, "Monday Mood", Category::Funny, 0, 1),
            meme(2, "cat pic", Category::Funny, 0, 2),
        ];
        let filtered = apply_text_filter(memes, "monday");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn text_filter_matches_category_label() {
        let memes = vec![
            meme(1, "xyzzy", Category::DarkHumor, 0, 1),
            meme(2, "abc", Category::Funny, 0, 2),
        ];
        let filtered = apply_text_filter(memes, "dark");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let memes = vec![meme(1, "a", Category::Funny, 0, 1)];
        assert_eq!(apply_text_filter(memes, "").len(), 1);
    }

    #[test]
    fn page_slice_windows_and_empties_past_end() {
        let memes: Vec<Meme> =
            (1..=5).map(|id| meme(id, "m", Category::Funny, 0, id)).collect();
        let page2 = page_slice(memes.clone(), 2, 2);
        assert_eq!(page2.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 4]);
        assert!(page_slice(memes, 10, 2).is_empty());
    }
}
