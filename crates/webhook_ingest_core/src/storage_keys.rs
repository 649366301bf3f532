use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;

pub const PAYLOAD_KEY_PREFIX: &str = "payloads";
pub const PAYLOAD_KEY_EXTENSION: &str = "json";
pub const SUFFIX_LEN: usize = 13;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Object key for one stored payload, together with the timestamp it embeds.
///
/// Uniqueness rests on millisecond time plus a base-36 suffix; collisions are
/// not detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    key: String,
    timestamp: String,
}

impl StorageKey {
    pub fn generate(received_at: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let timestamp = iso_timestamp(received_at);
        let key = payload_object_key(&timestamp, &random_suffix(rng));
        Self { key, timestamp }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

/// UTC with millisecond precision and a trailing `Z`, e.g. `2026-02-14T08:15:42.123Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn random_suffix(rng: &mut impl Rng) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

pub fn payload_object_key(timestamp: &str, suffix: &str) -> String {
    format!("{PAYLOAD_KEY_PREFIX}/{timestamp}-{suffix}.{PAYLOAD_KEY_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-14T08:15:42.123Z")
            .expect("fixture timestamp should parse")
            .with_timezone(&Utc)
    }

    #[test]
    fn builds_payload_key_with_prefix_and_extension() {
        let key = payload_object_key("2026-02-14T08:15:42.123Z", "k3j9x0abc12de");
        assert_eq!(key, "payloads/2026-02-14T08:15:42.123Z-k3j9x0abc12de.json");
    }

    #[test]
    fn formats_timestamp_with_millis_and_zulu() {
        assert_eq!(iso_timestamp(fixed_time()), "2026-02-14T08:15:42.123Z");
    }

    #[test]
    fn suffix_is_lowercase_base36() {
        let mut rng = StdRng::seed_from_u64(7);
        let suffix = random_suffix(&mut rng);

        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn generated_key_embeds_its_timestamp() {
        let mut rng = StdRng::seed_from_u64(11);
        let key = StorageKey::generate(fixed_time(), &mut rng);

        assert_eq!(key.timestamp(), "2026-02-14T08:15:42.123Z");
        let suffix = key
            .as_str()
            .strip_prefix("payloads/2026-02-14T08:15:42.123Z-")
            .and_then(|rest| rest.strip_suffix(".json"))
            .expect("key should follow payloads/<timestamp>-<suffix>.json");
        assert_eq!(suffix.len(), SUFFIX_LEN);
    }

    #[test]
    fn same_instant_yields_distinct_keys() {
        let mut rng = rand::thread_rng();
        let first = StorageKey::generate(fixed_time(), &mut rng);
        let second = StorageKey::generate(fixed_time(), &mut rng);

        assert_ne!(first, second);
    }
}
