//! Content fingerprinting for de-duplication.
//!
//! Two byte-identical blobs always produce the same digest; distinct blobs
//! collide only with negligible probability. Pure and infallible: empty or
//! malformed input still hashes deterministically.

/// Compute the hex fingerprint of a binary blob.
pub fn fingerprint(blob: &[u8]) -> String {
    format!("{:x}", md5::compute(blob))
}

/// Length of the hex digest produced by [`fingerprint`].
pub const FINGERPRINT_LEN: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        let blob = b"some image bytes";
        assert_eq!(fingerprint(blob), fingerprint(blob));
    }

    #[test]
    fn distinct_blobs_distinct_digests() {
        let a = fingerprint(b"image-a");
        let b = fingerprint(b"image-b");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_blob_hashes() {
        let digest = fingerprint(b"");
        assert_eq!(digest.len(), FINGERPRINT_LEN);
        // MD5 of the empty input is a fixed constant.
        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = fingerprint(b"anything");
        assert_eq!(digest.len(), FINGERPRINT_LEN);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
