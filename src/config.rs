// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Run Settings
//
// Resolution order: defaults, then an optional JSON file, then `BREAKTEST_*`
// environment variables. Command-line flags are applied last by the binary.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pipeline::{default_workers, Pipeline};
use crate::simulation::{DEFAULT_INSTANCES, DEFAULT_ROUNDS};

pub const ENV_PREFIX: &str = "BREAKTEST_";
pub const DEFAULT_NUM_MECHANISMS: usize = 1000;
pub const DEFAULT_TOP_N: usize = 150;
pub const DEFAULT_OUTPUT: &str = "governance_results";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: String, value: String },
}

/// Everything a sweep needs besides the mechanisms themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakTestSettings {
    /// `None` sweeps the full grid.
    pub num_mechanisms: Option<usize>,
    pub workers: usize,
    pub seed: u64,
    pub instances: usize,
    pub rounds: usize,
    pub top_n: usize,
    pub output: String,
    pub write_json: bool,
    /// Evaluate only the real-world reference catalog.
    pub catalog_only: bool,
}

impl Default for BreakTestSettings {
    fn default() -> Self {
        Self {
            num_mechanisms: Some(DEFAULT_NUM_MECHANISMS),
            workers: default_workers(),
            seed: 0,
            instances: DEFAULT_INSTANCES,
            rounds: DEFAULT_ROUNDS,
            top_n: DEFAULT_TOP_N,
            output: DEFAULT_OUTPUT.to_string(),
            write_json: false,
            catalog_only: false,
        }
    }
}

impl BreakTestSettings {
    /// Defaults, overlaid with `file` if given, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Missing fields fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `BREAKTEST_*` variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = var("NUM_MECHANISMS") {
            self.num_mechanisms = parse_mechanism_count(&value)
                .ok_or(SettingsError::InvalidEnv { key, value })?;
        }
        if let Some(kv) = var("WORKERS") {
            self.workers = parse_env(kv)?;
        }
        if let Some(kv) = var("SEED") {
            self.seed = parse_env(kv)?;
        }
        if let Some(kv) = var("INSTANCES") {
            self.instances = parse_env(kv)?;
        }
        if let Some(kv) = var("ROUNDS") {
            self.rounds = parse_env(kv)?;
        }
        if let Some(kv) = var("TOP") {
            self.top_n = parse_env(kv)?;
        }
        if let Some((_, value)) = var("OUTPUT") {
            self.output = value;
        }
        if let Some(kv) = var("JSON") {
            self.write_json = parse_env(kv)?;
        }
        if let Some(kv) = var("CATALOG") {
            self.catalog_only = parse_env(kv)?;
        }
        Ok(())
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.workers, self.seed).with_rounds(self.instances, self.rounds)
    }

    /// Rounds voted per mechanism across all four attacks.
    pub fn votes_per_mechanism(&self) -> usize {
        4 * self.instances * self.rounds
    }
}

/// `-1` or `all` selects the full grid.
pub fn parse_mechanism_count(value: &str) -> Option<Option<usize>> {
    let value = value.trim();
    if value == "-1" || value.eq_ignore_ascii_case("all") {
        return Some(None);
    }
    value.parse().ok().map(Some)
}

fn parse_env<T: FromStr>((key, value): (String, String)) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidEnv { key, value })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = BreakTestSettings::default();
        assert_eq!(s.num_mechanisms, Some(1000));
        assert_eq!(s.instances, 30);
        assert_eq!(s.rounds, 20);
        assert_eq!(s.top_n, 150);
        assert_eq!(s.output, "governance_results");
        assert!(s.workers >= 1);
        assert_eq!(s.votes_per_mechanism(), 2400);
    }

    #[test]
    fn env_overrides_fields() {
        let mut s = BreakTestSettings::default();
        s.apply_env(env(&[
            ("BREAKTEST_SEED", "42"),
            ("BREAKTEST_ROUNDS", " 5 "),
            ("BREAKTEST_OUTPUT", "sweep"),
            ("BREAKTEST_JSON", "true"),
            ("BREAKTEST_NUM_MECHANISMS", "all"),
        ]))
        .unwrap();
        assert_eq!(s.seed, 42);
        assert_eq!(s.rounds, 5);
        assert_eq!(s.output, "sweep");
        assert!(s.write_json);
        assert_eq!(s.num_mechanisms, None);
        assert_eq!(s.instances, 30);
    }

    #[test]
    fn malformed_env_is_an_error() {
        let mut s = BreakTestSettings::default();
        let err = s.apply_env(env(&[("BREAKTEST_WORKERS", "many")])).unwrap_err();
        match err {
            SettingsError::InvalidEnv { key, value } => {
                assert_eq!(key, "BREAKTEST_WORKERS");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: BreakTestSettings = serde_json::from_str(r#"{"seed": 9, "top_n": 20}"#).unwrap();
        assert_eq!(s.seed, 9);
        assert_eq!(s.top_n, 20);
        assert_eq!(s.rounds, 20);
        assert_eq!(s.num_mechanisms, Some(1000));
    }

    #[test]
    fn mechanism_count_parsing() {
        assert_eq!(parse_mechanism_count("-1"), Some(None));
        assert_eq!(parse_mechanism_count("ALL"), Some(None));
        assert_eq!(parse_mechanism_count("250"), Some(Some(250)));
        assert_eq!(parse_mechanism_count("-5"), None);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = BreakTestSettings::from_file(Path::new("/nonexistent/breaktest.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/breaktest.json"));
    }
}
