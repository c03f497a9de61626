use serde::Deserialize;

/// One candidate item offered by the upstream source for a topic.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub title: String,
    /// Locator for the backing image blob.
    #[serde(rename = "url")]
    pub image_url: String,
    /// Explicit-content flag; flagged candidates are never ingested.
    #[serde(default)]
    pub nsfw: bool,
    /// Upstream popularity signal, seeds the likes counter.
    #[serde(default, rename = "ups")]
    pub upstream_ups: i32,
    /// Topic key the source filed this candidate under; may differ from the
    /// requested one when the source mixes related topics.
    #[serde(default, rename = "subreddit")]
    pub source_topic: String,
}

/// Wire shape of the source's listing response.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub memes: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_deserializes_from_source_payload() {
        let json = serde_json::json!({
            "title": "A fine meme",
            "url": "https://i.example/abc.png",
            "nsfw": false,
            "ups": 1234,
            "subreddit": "memes"
        });
        let candidate: Candidate = serde_json::from_value(json).unwrap();
        assert_eq!(candidate.title, "A fine meme");
        assert_eq!(candidate.image_url, "https://i.example/abc.png");
        assert!(!candidate.nsfw);
        assert_eq!(candidate.upstream_ups, 1234);
        assert_eq!(candidate.source_topic, "memes");
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = serde_json::json!({
            "title": "Bare",
            "url": "https://i.example/bare.jpg"
        });
        let candidate: Candidate = serde_json::from_value(json).unwrap();
        assert!(!candidate.nsfw);
        assert_eq!(candidate.upstream_ups, 0);
        assert_eq!(candidate.source_topic, "");
    }

    #[test]
    fn empty_listing_deserializes() {
        let listing: ListingResponse = serde_json::from_str("{}").unwrap();
        assert!(listing.memes.is_empty());
    }
}
