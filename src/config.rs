//! Runtime configuration.
//!
//! Values come from `MEDICHAT_*` environment variables with typed defaults.
//! Unparseable values are ignored and the default is kept. Triage and ranking
//! parameters may also come from `policy.json` in the assets directory; the
//! environment overrides the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::assets::read_json;
use crate::adapters::AssetError;
use crate::domain::{RankingConfig, TriageConfig};

pub const POLICY_FILE: &str = "policy.json";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "file" => Some(Self::File),
            "stdout" => Some(Self::Stdout),
            _ => None,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Optional policy overrides shipped with the assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFile {
    pub ranking: RankingConfig,
    pub triage: TriageConfig,
}

impl PolicyFile {
    /// Read `policy.json` from `assets_dir` if present.
    ///
    /// # Errors
    /// Returns `AssetError` if the file exists but cannot be parsed.
    pub fn load(assets_dir: &Path) -> Result<Option<Self>, AssetError> {
        let path = assets_dir.join(POLICY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let policy: Self = read_json(&path)?;
        tracing::info!(
            "Loaded {} ({} critical diseases)",
            POLICY_FILE,
            policy.triage.critical_diseases.len()
        );
        Ok(Some(policy))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub assets_path: PathBuf,
    pub user: String,
    pub classifier_timeout: Duration,
    pub require_manifest: bool,
    pub ranking: RankingConfig,
    pub triage: TriageConfig,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_path: PathBuf::from("assets"),
            user: "there".to_string(),
            classifier_timeout: Duration::from_millis(5000),
            require_manifest: false,
            ranking: RankingConfig::default(),
            triage: TriageConfig::default(),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("medichat.log"),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

fn parse_threshold(v: &str) -> Option<f64> {
    v.trim()
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite() && (0.0..=1.0).contains(x))
}

impl AppConfig {
    /// Configuration from the environment, layered over `policy.json`.
    ///
    /// # Errors
    /// Returns `AssetError` if `policy.json` exists but is malformed.
    pub fn load() -> Result<Self, AssetError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    fn load_with<F>(lookup: F) -> Result<Self, AssetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::from_lookup(&lookup);
        if let Some(policy) = PolicyFile::load(&cfg.assets_path)? {
            cfg.ranking = policy.ranking;
            cfg.triage = policy.triage;
            cfg.apply_policy_overrides(&lookup);
        }
        Ok(cfg)
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("MEDICHAT_ASSETS_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.assets_path = PathBuf::from(v.trim());
        }

        if let Some(user) = lookup("MEDICHAT_USER")
            .or_else(|| lookup("USER"))
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
        {
            cfg.user = user;
        }

        if let Some(ms) = lookup("MEDICHAT_CLASSIFIER_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
        {
            cfg.classifier_timeout = Duration::from_millis(ms);
        }

        if let Some(b) = lookup("MEDICHAT_REQUIRE_MANIFEST").and_then(|v| parse_bool(&v)) {
            cfg.require_manifest = b;
        }

        if let Some(mode) = lookup("MEDICHAT_LOG_MODE").and_then(|v| LogMode::parse(&v)) {
            cfg.log_mode = mode;
        }

        if let Some(file) = lookup("MEDICHAT_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            cfg.log_file = PathBuf::from(file.trim());
        }

        cfg.apply_policy_overrides(&lookup);
        cfg
    }

    fn apply_policy_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(x) = lookup("MEDICHAT_AMBIGUITY_THRESHOLD").and_then(|v| parse_threshold(&v)) {
            self.triage.ambiguity_threshold = x;
        }
        if let Some(x) = lookup("MEDICHAT_SECONDARY_THRESHOLD").and_then(|v| parse_threshold(&v)) {
            self.ranking.secondary_threshold = x;
        }
        if let Some(days) = lookup("MEDICHAT_MAX_HOME_CARE_DAYS")
            .and_then(|v| v.trim().parse::<u16>().ok())
        {
            self.triage.max_home_care_days = days;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(vars(&[]));
        assert_eq!(cfg.assets_path, PathBuf::from("assets"));
        assert_eq!(cfg.user, "there");
        assert_eq!(cfg.classifier_timeout, Duration::from_secs(5));
        assert!((cfg.triage.ambiguity_threshold - 0.45).abs() < f64::EPSILON);
        assert!((cfg.ranking.secondary_threshold - 0.05).abs() < f64::EPSILON);
        assert_eq!(cfg.triage.max_home_care_days, 5);
    }

    #[test]
    fn test_env_values_and_invalid_values() {
        let cfg = AppConfig::from_lookup(vars(&[
            ("MEDICHAT_USER", "erin"),
            ("USER", "root"),
            ("MEDICHAT_CLASSIFIER_TIMEOUT_MS", "250"),
            ("MEDICHAT_REQUIRE_MANIFEST", "yes"),
            ("MEDICHAT_AMBIGUITY_THRESHOLD", "1.7"),
            ("MEDICHAT_MAX_HOME_CARE_DAYS", "7"),
            ("MEDICHAT_LOG_MODE", "stdout"),
        ]));
        assert_eq!(cfg.user, "erin");
        assert_eq!(cfg.classifier_timeout, Duration::from_millis(250));
        assert!(cfg.require_manifest);
        assert!((cfg.triage.ambiguity_threshold - 0.45).abs() < f64::EPSILON);
        assert_eq!(cfg.triage.max_home_care_days, 7);
        assert!(!cfg.log_mode.use_file(true));
    }

    #[test]
    fn test_policy_file_then_env() {
        let dir = tempdir().expect("Should create temp dir");
        std::fs::write(
            dir.path().join(POLICY_FILE),
            r#"{
                "ranking": { "top_k": 2 },
                "triage": {
                    "critical_diseases": ["Heart attack"],
                    "ambiguity_threshold": 0.6,
                    "elevated_risk_factors": ["Asthma"]
                }
            }"#,
        )
        .expect("Should write");
        let assets = dir.path().display().to_string();

        let cfg = AppConfig::load_with(vars(&[
            ("MEDICHAT_ASSETS_PATH", assets.as_str()),
            ("MEDICHAT_SECONDARY_THRESHOLD", "0.1"),
        ]))
        .expect("Should load");

        assert_eq!(cfg.ranking.top_k, 2);
        assert!((cfg.ranking.secondary_threshold - 0.1).abs() < f64::EPSILON);
        assert_eq!(cfg.triage.critical_diseases, vec!["Heart attack".to_string()]);
        assert!((cfg.triage.ambiguity_threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(cfg.triage.max_home_care_days, 5);
    }

    #[test]
    fn test_auto_log_mode_follows_terminal() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
    }
}
