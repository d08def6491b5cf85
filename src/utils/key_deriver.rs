//! Deterministic key derivation and the fallback key generator.
//!
//! Keys are truncated hex renderings of a fast non-cryptographic hash of the
//! URL. The attempt index both salts the input and selects one of four hash
//! variants, so each retry lands in a different region of the key space.

use chrono::Utc;
use rand::Rng;
use xxhash_rust::{xxh32::xxh32, xxh64::xxh64};

use crate::config::{HashSeeds, KeySettings};

/// Number of hash variants cycled through by attempt index.
const VARIANT_COUNT: u32 = 4;

/// Mixed into the variant seed when the rendered hash is shorter than the key.
const EXTENSION_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random characters appended to the timestamp part of a fallback key.
const FALLBACK_RANDOM_CHARS: usize = 4;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Pure key deriver configured once at startup.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    seeds: HashSeeds,
    key_length: usize,
}

impl KeyDeriver {
    pub fn new(settings: &KeySettings) -> Self {
        Self {
            seeds: settings.seeds,
            key_length: settings.key_length,
        }
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// Derives the candidate key for `url` at `attempt` with the configured length.
    pub fn derive(&self, url: &str, attempt: u32) -> String {
        derive_key(url, attempt, self.key_length, &self.seeds)
    }
}

/// Derives a candidate key for a URL.
///
/// The input is `url` for attempt 0 and `url + "_" + attempt` afterwards.
/// `attempt % 4` picks the variant:
///
/// | attempt % 4 | hash | rendered width |
/// |---|---|---|
/// | 0 | xxh64, `primary64` seed | 16 |
/// | 1 | xxh64, `secondary64` seed | 16 |
/// | 2 | xxh32, `primary32` seed | 8 |
/// | 3 | xxh32, `secondary32` seed | 8 |
///
/// When the rendering is shorter than `size`, the input is hashed again with
/// a derived seed and appended until long enough. The result depends only on
/// the arguments.
pub fn derive_key(url: &str, attempt: u32, size: usize, seeds: &HashSeeds) -> String {
    let input = if attempt > 0 {
        format!("{}_{}", url, attempt)
    } else {
        url.to_string()
    };
    let bytes = input.as_bytes();

    let (mut hex, variant_seed) = match attempt % VARIANT_COUNT {
        0 => (format!("{:016x}", xxh64(bytes, seeds.primary64)), seeds.primary64),
        1 => (
            format!("{:016x}", xxh64(bytes, seeds.secondary64)),
            seeds.secondary64,
        ),
        2 => (
            format!("{:08x}", xxh32(bytes, seeds.primary32)),
            u64::from(seeds.primary32),
        ),
        _ => (
            format!("{:08x}", xxh32(bytes, seeds.secondary32)),
            u64::from(seeds.secondary32),
        ),
    };

    let mut round = 1u64;
    while hex.len() < size {
        let extension_seed = variant_seed ^ EXTENSION_SEED.wrapping_mul(round);
        hex.push_str(&format!("{:016x}", xxh64(bytes, extension_seed)));
        round += 1;
    }

    hex.truncate(size);
    hex
}

/// Generates a key independent of the URL hash.
///
/// Only used after every hash attempt collided. The key is the low-order
/// base-36 digits of the current millisecond timestamp followed by random
/// base-36 characters, `size` characters in total. Not reproducible.
pub fn generate_fallback_key(size: usize) -> String {
    let random_chars = FALLBACK_RANDOM_CHARS.min(size);
    let timestamp_chars = size - random_chars;

    let timestamp = to_base36(Utc::now().timestamp_millis().unsigned_abs());
    let timestamp_part = &timestamp[timestamp.len().saturating_sub(timestamp_chars)..];

    let mut rng = rand::rng();
    let mut key = String::with_capacity(size);
    key.push_str(timestamp_part);
    while key.len() < size {
        let idx = rng.random_range(0..BASE36_ALPHABET.len());
        key.push(BASE36_ALPHABET[idx] as char);
    }

    key
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}
