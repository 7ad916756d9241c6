//! # CLI - interactive shell
//!
//! A REPL-style command-line interface for the storage engine. Reads
//! commands from stdin, executes them against a Bloom-wrapped, segmented
//! engine, and prints results to stdout. Works equally well interactively or
//! piped (`echo "SET a 1" | cargo run -p cli`).
//!
//! ## Commands
//!
//! ```text
//! SET key value   Insert or update a key-value pair
//! GET key         Look up a key (prints value or "(nil)")
//! SCAN            Print every key-value pair in the store
//! COMPACT         Collapse the segment chain and rebuild the Bloom filter
//! STATS           Print segment count and entry count
//! EXIT / QUIT     Shut down
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables; see
//! [`config::EngineConfig::from_env`] for the full list.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use bloom::BloomFilter;
use bloom_engine::BloomEngine;
use config::{BloomSizing, EngineConfig};
use engine_api::Engine;
use segmented_engine::SegmentedEngine;

type Store = BloomEngine<SegmentedEngine<String, String>, String, String>;

fn build_store(cfg: &EngineConfig) -> Result<Store> {
    let inner = SegmentedEngine::open(&cfg.segment_dir, cfg.max_segment_size)
        .context("failed to open segment chain")?;
    let store = match cfg.bloom {
        BloomSizing::Auto {
            expected_items,
            false_positive_rate,
        } => BloomEngine::new(inner, expected_items, false_positive_rate),
        BloomSizing::Fixed {
            num_bits,
            num_hashes,
        } => BloomEngine::with_filter(inner, BloomFilter::with_dimensions(num_bits, num_hashes)),
    };
    Ok(store)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = EngineConfig::from_env();
    let mut store = build_store(&cfg)?;

    tracing::info!(
        segment_dir = %cfg.segment_dir.display(),
        max_segment_size = cfg.max_segment_size,
        "store started"
    );
    println!(
        "store started (segment_dir={}, max_segment_size={})",
        cfg.segment_dir.display(),
        cfg.max_segment_size
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match dispatch(&mut store, line) {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => break,
            Err(e) => println!("ERR {e}"),
        }
    }

    Ok(())
}

/// Executes one REPL line. `Ok(None)` signals a graceful shutdown request.
fn dispatch(store: &mut Store, line: &str) -> Result<Option<String>> {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or("").to_ascii_uppercase();

    let output = match command.as_str() {
        "SET" => {
            let key = parts.next().context("SET requires a key")?;
            let value = parts.next().context("SET requires a value")?;
            store.set(key.to_string(), value.to_string())?;
            "OK".to_string()
        }
        "GET" => {
            let key = parts.next().context("GET requires a key")?;
            match store.try_get(&key.to_string())? {
                Some(value) => value,
                None => "(nil)".to_string(),
            }
        }
        "SCAN" => {
            let all = store.get_all()?;
            let mut out = String::new();
            for (key, value) in &all {
                out.push_str(&format!("{key} -> {value}\n"));
            }
            out.push_str(&format!("({} entries)", all.len()));
            out
        }
        "COMPACT" => {
            store.compact()?;
            "OK".to_string()
        }
        "STATS" => {
            let entries = store.get_all()?.len();
            let segments = store.inner().segment_count();
            format!("entries={entries} segments={segments}")
        }
        "EXIT" | "QUIT" => return Ok(None),
        other => format!("unknown command: {other}"),
    };
    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig {
            segment_dir: dir.path().to_path_buf(),
            max_segment_size: 1 << 20,
            ..EngineConfig::default()
        };
        let store = build_store(&cfg).unwrap();
        (dir, store)
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_dir, mut store) = fresh_store();
        assert_eq!(dispatch(&mut store, "SET a 1").unwrap(), Some("OK".to_string()));
        assert_eq!(dispatch(&mut store, "GET a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn get_missing_key_reports_nil() {
        let (_dir, mut store) = fresh_store();
        assert_eq!(dispatch(&mut store, "GET missing").unwrap(), Some("(nil)".to_string()));
    }

    #[test]
    fn exit_and_quit_signal_shutdown() {
        let (_dir, mut store) = fresh_store();
        assert_eq!(dispatch(&mut store, "EXIT").unwrap(), None);
        assert_eq!(dispatch(&mut store, "QUIT").unwrap(), None);
    }

    #[test]
    fn unknown_command_is_reported_without_erroring() {
        let (_dir, mut store) = fresh_store();
        let out = dispatch(&mut store, "FROBNICATE").unwrap().unwrap();
        assert!(out.starts_with("unknown command"));
    }

    #[test]
    fn stats_reports_entry_and_segment_counts() {
        let (_dir, mut store) = fresh_store();
        dispatch(&mut store, "SET a 1").unwrap();
        let out = dispatch(&mut store, "STATS").unwrap().unwrap();
        assert!(out.contains("entries=1"));
        assert!(out.contains("segments="));
    }

    #[test]
    fn compact_then_get_still_finds_value() {
        let (_dir, mut store) = fresh_store();
        dispatch(&mut store, "SET a 1").unwrap();
        dispatch(&mut store, "COMPACT").unwrap();
        assert_eq!(dispatch(&mut store, "GET a").unwrap(), Some("1".to_string()));
    }
}
