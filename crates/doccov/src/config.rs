//! Configuration schema for doccov.
//!
//! Config lives at `doccov.json` relative to the project root:
//!
//! ```json
//! {
//!   "include": ["src/**/*.ts"],
//!   "exclude": ["node_modules/**"],
//!   "store": "docrefs.json",
//!   "thresholds": { "overall": 80, "src": 90 }
//! }
//! ```
//!
//! A missing config file is not an error; every field has a default. The
//! loader only produces the normalized shape the engine asks for; anything
//! smarter (multi-format extraction, test-runner config mining) belongs to
//! whatever writes `doccov.json`.

use doccov_core::{ReportOptions, DEFAULT_THRESHOLD};
use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default documentation store file, relative to the project root.
pub const DEFAULT_STORE_FILE: &str = "docrefs.json";

/// Default config file, relative to the project root.
pub const CONFIG_FILE: &str = "doccov.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Documentation reference store file, relative to the root.
    #[serde(default)]
    pub store: Option<PathBuf>,
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// `overall` plus any number of named scope thresholds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub overall: Option<f64>,
    #[serde(flatten)]
    pub scopes: BTreeMap<String, f64>,
}

impl Config {
    /// Load from `path`; a missing file yields the default config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config from {}", path.display()))
    }

    /// Lower the config into the engine's options. Empty include/exclude
    /// lists fall back to the engine defaults.
    pub fn report_options(&self, root: &Path, threshold_override: Option<f64>) -> ReportOptions {
        let defaults = ReportOptions::default();
        ReportOptions {
            include: if self.include.is_empty() {
                defaults.include
            } else {
                self.include.clone()
            },
            exclude: if self.exclude.is_empty() {
                defaults.exclude
            } else {
                self.exclude.clone()
            },
            root_dir: root.to_path_buf(),
            threshold: threshold_override
                .or(self.thresholds.overall)
                .unwrap_or(DEFAULT_THRESHOLD),
            scope_thresholds: self.thresholds.scopes.clone(),
            scan_filesystem: true,
        }
    }

    /// Absolute path of the documentation store file.
    pub fn store_path(&self, root: &Path) -> PathBuf {
        root.join(
            self.store
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let config = Config::load(Path::new("/nonexistent/doccov.json")).unwrap();
        assert!(config.include.is_empty());
        assert!(config.thresholds.overall.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doccov.json");
        std::fs::write(
            &path,
            r#"{
                "include": ["src/**/*.ts"],
                "exclude": ["dist/**"],
                "store": "notes/refs.json",
                "thresholds": { "overall": 75, "src": 90, "tests": 40 }
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.include, vec!["src/**/*.ts"]);
        assert_eq!(config.thresholds.overall, Some(75.0));
        assert_eq!(config.thresholds.scopes.get("src"), Some(&90.0));
        assert_eq!(config.thresholds.scopes.get("tests"), Some(&40.0));

        let options = config.report_options(Path::new("/proj"), None);
        assert_eq!(options.threshold, 75.0);
        assert_eq!(options.scope_thresholds.len(), 2);

        assert_eq!(
            config.store_path(Path::new("/proj")),
            PathBuf::from("/proj/notes/refs.json")
        );
    }

    #[test]
    fn test_threshold_override_wins() {
        let config = Config {
            thresholds: Thresholds {
                overall: Some(75.0),
                scopes: BTreeMap::new(),
            },
            ..Config::default()
        };
        let options = config.report_options(Path::new("."), Some(95.0));
        assert_eq!(options.threshold, 95.0);
    }

    #[test]
    fn test_empty_include_falls_back_to_engine_defaults() {
        let config = Config::default();
        let options = config.report_options(Path::new("."), None);
        assert!(!options.include.is_empty());
        assert_eq!(options.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doccov.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
