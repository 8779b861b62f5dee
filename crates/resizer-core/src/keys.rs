//! Deterministic key derivation.
//!
//! Key format: `<fileName>-<fingerprint>-<width>-<height>`, where `fileName` is the last
//! path segment of the source URL and `fingerprint` a stable hash of the whole source
//! string. The public location is the key behind the configured public prefix.
//!
//! The same `(source, width, height)` always maps to the same key for a given prefix and
//! fingerprint scheme, which is what lets the store act as a memoizing cache.

use crate::error::KeyError;
use crate::models::DerivedKey;
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use url::Url;

/// Hash used for the fingerprint component of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintScheme {
    /// 31-multiplier polynomial hash over UTF-16 code units with 32-bit wraparound.
    /// Keeps keys identical to objects already published by earlier deployments.
    #[default]
    Legacy,
    /// First eight bytes of the SHA-256 digest, big-endian.
    Sha256,
}

impl FingerprintScheme {
    /// Stable, non-negative fingerprint of `source`.
    pub fn fingerprint(self, source: &str) -> u64 {
        match self {
            FingerprintScheme::Legacy => u64::from(legacy_hash(source).unsigned_abs()),
            FingerprintScheme::Sha256 => {
                let digest = Sha256::digest(source.as_bytes());
                let mut prefix = [0u8; 8];
                prefix.copy_from_slice(&digest[..8]);
                u64::from_be_bytes(prefix)
            }
        }
    }
}

fn legacy_hash(source: &str) -> i32 {
    source
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

impl FromStr for FingerprintScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(FingerprintScheme::Legacy),
            "sha256" => Ok(FingerprintScheme::Sha256),
            _ => Err(anyhow::anyhow!("Invalid fingerprint scheme: {}", s)),
        }
    }
}

impl Display for FingerprintScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FingerprintScheme::Legacy => write!(f, "legacy"),
            FingerprintScheme::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Extract the file name of a source URL: the last non-empty segment of the
/// percent-decoded path.
///
/// The path is decoded before it is split, so an encoded `%2F` separates segments and a
/// file name never contains `/`. Locations without a path yield an empty file name; only
/// an unparsable location is an error.
pub fn file_name_of(source: &str) -> Result<String, KeyError> {
    let url = Url::parse(source).map_err(|e| KeyError::InvalidSourceLocation {
        location: source.to_string(),
        reason: e.to_string(),
    })?;

    let path = percent_decode_str(url.path()).decode_utf8_lossy();
    let file_name = path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string();

    Ok(file_name)
}

/// Computes [`DerivedKey`]s for one deployment (public prefix + fingerprint scheme).
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    public_url: String,
    scheme: FingerprintScheme,
}

impl KeyDeriver {
    pub fn new(public_url: impl Into<String>, scheme: FingerprintScheme) -> Self {
        Self {
            public_url: public_url.into(),
            scheme,
        }
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    pub fn scheme(&self) -> FingerprintScheme {
        self.scheme
    }

    /// Derive the key for a request. Never fails: an unparsable source is logged and
    /// contributes an empty file name.
    pub fn derive(&self, source: &str, width: u32, height: u32) -> DerivedKey {
        let file_name = file_name_of(source).unwrap_or_else(|e| {
            tracing::warn!(location = %source, error = %e, "Unable to create url");
            String::new()
        });
        let fingerprint = self.scheme.fingerprint(source);

        let object_key = format!("{}-{}-{}-{}", file_name, fingerprint, width, height);
        let location = format!("{}{}", self.public_url, object_key);

        DerivedKey {
            object_key,
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAT: &str = "https://cdn.example.com/img/cat.jpg";

    fn deriver() -> KeyDeriver {
        KeyDeriver::new("https://out.example.com/", FingerprintScheme::Legacy)
    }

    #[test]
    fn legacy_hash_matches_known_values() {
        assert_eq!(legacy_hash(""), 0);
        assert_eq!(legacy_hash("hello"), 99_162_322);
        assert_eq!(legacy_hash(CAT), -114_832_261);
        // Surrogate pairs hash as two UTF-16 units.
        assert_eq!(legacy_hash("a😀"), 1_866_116);
    }

    #[test]
    fn legacy_fingerprint_is_never_negative() {
        assert_eq!(legacy_hash("polygenelubricants"), i32::MIN);
        assert_eq!(
            FingerprintScheme::Legacy.fingerprint("polygenelubricants"),
            2_147_483_648
        );
        assert_eq!(FingerprintScheme::Legacy.fingerprint(CAT), 114_832_261);
    }

    #[test]
    fn sha256_fingerprint_uses_digest_prefix() {
        assert_eq!(
            FingerprintScheme::Sha256.fingerprint(CAT),
            6_419_347_733_711_689_728
        );
    }

    #[test]
    fn derives_documented_key_shape() {
        let key = deriver().derive(CAT, 100, 50);
        assert_eq!(key.object_key, "cat.jpg-114832261-100-50");
        assert_eq!(key.location, "https://out.example.com/cat.jpg-114832261-100-50");
    }

    #[test]
    fn derivation_is_deterministic() {
        let deriver = deriver();
        assert_eq!(deriver.derive(CAT, 100, 50), deriver.derive(CAT, 100, 50));

        let sha = KeyDeriver::new("https://out.example.com/", FingerprintScheme::Sha256);
        assert_eq!(sha.derive(CAT, 7, 9), sha.derive(CAT, 7, 9));
    }

    #[test]
    fn key_is_sensitive_to_every_parameter() {
        let deriver = deriver();
        let base = deriver.derive(CAT, 100, 50);

        assert_ne!(base, deriver.derive(CAT, 100, 51));
        assert_ne!(base, deriver.derive(CAT, 101, 50));
        assert_ne!(base, deriver.derive("https://cdn.example.com/other/cat.jpg", 100, 50));
    }

    #[test]
    fn unparsable_source_falls_back_to_empty_file_name() {
        let key = deriver().derive("not a valid uri", 10, 20);
        assert_eq!(key.object_key, "-1184371836-10-20");
        assert_eq!(key.location, "https://out.example.com/-1184371836-10-20");
    }

    #[test]
    fn file_name_handles_paths() {
        assert_eq!(file_name_of(CAT).unwrap(), "cat.jpg");
        assert_eq!(file_name_of("https://a.example.com/dir/").unwrap(), "dir");
        assert_eq!(file_name_of("https://a.example.com").unwrap(), "");
        assert_eq!(
            file_name_of("https://a.example.com/my%20cat.png?size=large#top").unwrap(),
            "my cat.png"
        );
        assert_eq!(file_name_of("file:///tmp/photos/dog.png").unwrap(), "dog.png");
    }

    #[test]
    fn encoded_separators_split_the_file_name() {
        let source = "https://cdn.example.com/img/a%2Fb.png";
        assert_eq!(file_name_of(source).unwrap(), "b.png");
        assert_eq!(file_name_of("https://cdn.example.com/img/a%2F").unwrap(), "a");

        let key = deriver().derive(source, 10, 20);
        assert_eq!(key.object_key, "b.png-1377940119-10-20");
        assert!(!key.object_key.contains('/'));
    }

    #[test]
    fn file_name_rejects_relative_or_garbage() {
        assert!(matches!(
            file_name_of("not a valid uri"),
            Err(KeyError::InvalidSourceLocation { .. })
        ));
        assert!(file_name_of("").is_err());
    }

    #[test]
    fn scheme_parses_from_config_strings() {
        assert_eq!("LEGACY".parse::<FingerprintScheme>().unwrap(), FingerprintScheme::Legacy);
        assert_eq!("sha256".parse::<FingerprintScheme>().unwrap(), FingerprintScheme::Sha256);
        assert!("md5".parse::<FingerprintScheme>().is_err());
    }
}
