//! # Engine configuration
//!
//! The teacher reserved a `config` crate but never populated it; every
//! setting lived as an `env_or`-style lookup scattered through its `cli`
//! crate instead. This crate centralizes the same environment-variable
//! convention into one typed, testable struct.

use std::path::PathBuf;

/// How a [`bloom::BloomFilter`] is sized for a store. Mutually exclusive by
/// construction: a filter is either sized from an expected item count and
/// target false-positive rate, or from an exact bit/hash-count pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BloomSizing {
    Auto {
        expected_items: usize,
        false_positive_rate: f64,
    },
    Fixed {
        num_bits: u64,
        num_hashes: u32,
    },
}

impl Default for BloomSizing {
    fn default() -> Self {
        BloomSizing::Auto {
            expected_items: 10_000,
            false_positive_rate: 0.01,
        }
    }
}

/// Settings needed to open a store: where its segments live, when a segment
/// rolls over, how large the MemTable grows before a flush, and how its
/// Bloom filter is sized.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub segment_dir: PathBuf,
    pub max_segment_size: u64,
    pub memtable_max_size: usize,
    pub bloom: BloomSizing,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            segment_dir: PathBuf::from("data/segments"),
            max_segment_size: 1024 * 1024,
            memtable_max_size: 10_000,
            bloom: BloomSizing::default(),
        }
    }
}

impl EngineConfig {
    /// Builds a config from environment variables, falling back to
    /// [`EngineConfig::default`] for anything unset or unparsable.
    ///
    /// ```text
    /// STORE_SEGMENT_DIR           segment directory        (default: "data/segments")
    /// STORE_MAX_SEGMENT_SIZE      segment rollover, bytes  (default: 1048576 = 1 MiB)
    /// STORE_MEMTABLE_MAX_SIZE     MemTable capacity, keys  (default: 10000)
    /// STORE_BLOOM_EXPECTED_ITEMS  Bloom sizing input n     (default: 10000)
    /// STORE_BLOOM_FPR             Bloom sizing input p     (default: 0.01)
    /// STORE_BLOOM_BITS            direct bit-array size m  (overrides n/p when paired with HASHES)
    /// STORE_BLOOM_HASHES          direct hash count k      (overrides n/p when paired with BITS)
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();

        let segment_dir = env_or("STORE_SEGMENT_DIR", &default.segment_dir.display().to_string());
        let max_segment_size = env_parsed("STORE_MAX_SEGMENT_SIZE", default.max_segment_size);
        let memtable_max_size = env_parsed("STORE_MEMTABLE_MAX_SIZE", default.memtable_max_size);

        let bloom = match (
            std::env::var("STORE_BLOOM_BITS").ok(),
            std::env::var("STORE_BLOOM_HASHES").ok(),
        ) {
            (Some(bits), Some(hashes)) => match (bits.parse(), hashes.parse()) {
                (Ok(num_bits), Ok(num_hashes)) => BloomSizing::Fixed {
                    num_bits,
                    num_hashes,
                },
                _ => default.bloom,
            },
            _ => {
                let expected_items = env_parsed("STORE_BLOOM_EXPECTED_ITEMS", 10_000usize);
                let false_positive_rate = env_parsed("STORE_BLOOM_FPR", 0.01f64);
                BloomSizing::Auto {
                    expected_items,
                    false_positive_rate,
                }
            }
        };

        Self {
            segment_dir: PathBuf::from(segment_dir),
            max_segment_size,
            memtable_max_size,
            bloom,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_segment_size, 1024 * 1024);
        assert_eq!(cfg.memtable_max_size, 10_000);
        assert!(matches!(cfg.bloom, BloomSizing::Auto { .. }));
    }

    #[test]
    fn env_parsed_falls_back_on_missing_var() {
        // A key that will never exist in the test environment.
        let v: u64 = env_parsed("STORE_CONFIG_TEST_DOES_NOT_EXIST_VAR", 42);
        assert_eq!(v, 42);
    }

    #[test]
    fn env_parsed_falls_back_on_unparsable_value() {
        std::env::set_var("STORE_CONFIG_TEST_BAD_INT", "not-a-number");
        let v: u64 = env_parsed("STORE_CONFIG_TEST_BAD_INT", 7);
        assert_eq!(v, 7);
        std::env::remove_var("STORE_CONFIG_TEST_BAD_INT");
    }

    #[test]
    fn bloom_sizing_is_fixed_only_when_both_bits_and_hashes_set() {
        std::env::set_var("STORE_BLOOM_BITS", "2048");
        std::env::set_var("STORE_BLOOM_HASHES", "4");
        let cfg = EngineConfig::from_env();
        assert_eq!(
            cfg.bloom,
            BloomSizing::Fixed {
                num_bits: 2048,
                num_hashes: 4
            }
        );
        std::env::remove_var("STORE_BLOOM_BITS");
        std::env::remove_var("STORE_BLOOM_HASHES");
    }
}
