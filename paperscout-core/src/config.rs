//! Configuration system for PaperScout.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/paperscout/config.toml` and/or
//! `.paperscout/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{LengthTier, SummaryBudget};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperScoutConfig {
    pub search: SearchConfig,
    pub summarizer: SummarizerConfig,
    pub pipeline: PipelineConfig,
}

/// Settings for the arXiv search client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Atom query endpoint.
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Result count used when the caller does not ask for one.
    pub default_max_results: usize,
    /// Upper bound applied to every request.
    pub max_results_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://export.arxiv.org/api/query".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            default_max_results: 10,
            max_results_cap: 50,
        }
    }
}

/// Settings for the summarization backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Backend name: "openai" or "huggingface".
    pub backend: String,
    /// Model identifier. Falls back to the backend's default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Override for the backend's API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Input is cut to this many characters before it is sent.
    pub input_char_budget: usize,
    pub tiers: LengthTierTable,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            model: None,
            base_url: None,
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            input_char_budget: 2000,
            tiers: LengthTierTable::default(),
        }
    }
}

impl SummarizerConfig {
    /// Resolve the API key from the inline value or the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Maximum summary length for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthTierTable {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

impl Default for LengthTierTable {
    fn default() -> Self {
        Self {
            short: 80,
            medium: 140,
            long: 220,
        }
    }
}

impl LengthTierTable {
    pub fn max_length(&self, tier: LengthTier) -> usize {
        match tier {
            LengthTier::Short => self.short,
            LengthTier::Medium => self.medium,
            LengthTier::Long => self.long,
        }
    }

    pub fn budget(&self, tier: LengthTier) -> SummaryBudget {
        SummaryBudget::from_max(self.max_length(tier))
    }
}

/// Settings for the signal pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Trimmed text must be longer than this many characters.
    pub min_readiness_chars: usize,
    pub keyword_count: usize,
    /// Leading keywords joined into a derived search query.
    pub query_keyword_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_readiness_chars: 200,
            keyword_count: 8,
            query_keyword_count: 3,
        }
    }
}

impl PaperScoutConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.search.base_url.trim().is_empty() {
            problems.push("search.base_url is empty".to_string());
        }
        if self.search.max_results_cap == 0 {
            problems.push("search.max_results_cap must be at least 1".to_string());
        }
        if self.search.default_max_results == 0 {
            problems.push("search.default_max_results must be at least 1".to_string());
        }
        if self.search.timeout_secs == 0 {
            problems.push("search.timeout_secs must be at least 1".to_string());
        }
        if self.summarizer.timeout_secs == 0 {
            problems.push("summarizer.timeout_secs must be at least 1".to_string());
        }
        if self.summarizer.input_char_budget == 0 {
            problems.push("summarizer.input_char_budget must be at least 1".to_string());
        }

        let tiers = &self.summarizer.tiers;
        if tiers.short == 0 {
            problems.push("summarizer.tiers.short must be at least 1".to_string());
        }
        if !(tiers.short < tiers.medium && tiers.medium < tiers.long) {
            problems.push(format!(
                "summarizer.tiers must be strictly increasing (short={}, medium={}, long={})",
                tiers.short, tiers.medium, tiers.long
            ));
        }

        if self.pipeline.keyword_count == 0 {
            problems.push("pipeline.keyword_count must be at least 1".to_string());
        }
        if self.pipeline.query_keyword_count == 0 {
            problems.push("pipeline.query_keyword_count must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                message: problems.join("; "),
            })
        }
    }
}

/// Directory holding the user-level configuration, if the platform has one.
pub fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "paperscout", "paperscout")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Load configuration by merging all sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `PAPERSCOUT_`)
/// 3. Workspace-local config (`.paperscout/config.toml`)
/// 4. User config (`~/.config/paperscout/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&PaperScoutConfig>,
) -> Result<PaperScoutConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(PaperScoutConfig::default()));

    // User-level config
    if let Some(config_dir) = user_config_dir() {
        let user_config = config_dir.join("config.toml");
        if user_config.exists() {
            tracing::debug!(path = %user_config.display(), "Merging user config");
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".paperscout").join("config.toml");
        if ws_config.exists() {
            tracing::debug!(path = %ws_config.display(), "Merging workspace config");
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (PAPERSCOUT_SEARCH__TIMEOUT_SECS, PAPERSCOUT_SUMMARIZER__BACKEND, etc.)
    figment = figment.merge(Env::prefixed("PAPERSCOUT_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: PaperScoutConfig = figment.extract().map_err(|e| ConfigError::Load {
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PaperScoutConfig::default();
        assert_eq!(config.search.base_url, "https://export.arxiv.org/api/query");
        assert_eq!(config.search.max_results_cap, 50);
        assert_eq!(config.summarizer.backend, "openai");
        assert_eq!(config.summarizer.input_char_budget, 2000);
        assert_eq!(config.pipeline.min_readiness_chars, 200);
        assert_eq!(config.pipeline.keyword_count, 8);
        assert_eq!(config.pipeline.query_keyword_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tier_budgets() {
        let tiers = LengthTierTable::default();
        assert_eq!(
            tiers.budget(LengthTier::Short),
            SummaryBudget {
                max_length: 80,
                min_length: 32
            }
        );
        assert!(
            tiers.budget(LengthTier::Long).max_length > tiers.budget(LengthTier::Short).max_length
        );
    }

    #[test]
    fn test_tier_budgets_strictly_increase() {
        let tiers = LengthTierTable::default();
        let budgets = LengthTier::ALL.map(|tier| tiers.budget(tier));
        for pair in budgets.windows(2) {
            assert!(pair[0].max_length < pair[1].max_length, "{pair:?}");
            assert!(pair[0].min_length < pair[1].min_length, "{pair:?}");
        }
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PaperScoutConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: PaperScoutConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PaperScoutConfig = toml::from_str(
            r#"
[summarizer]
backend = "huggingface"
"#,
        )
        .unwrap();
        assert_eq!(config.summarizer.backend, "huggingface");
        assert_eq!(config.summarizer.tiers, LengthTierTable::default());
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_validate_rejects_non_increasing_tiers() {
        let mut config = PaperScoutConfig::default();
        config.summarizer.tiers.medium = 80;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let mut config = PaperScoutConfig::default();
        config.search.max_results_cap = 0;
        config.summarizer.input_char_budget = 0;
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("max_results_cap"));
        assert!(message.contains("input_char_budget"));
    }

    #[test]
    fn test_load_config_with_overrides() {
        let mut overrides = PaperScoutConfig::default();
        overrides.pipeline.min_readiness_chars = 50;
        overrides.summarizer.backend = "huggingface".to_string();

        let config = load_config(None, Some(&overrides)).unwrap();
        assert_eq!(config.pipeline.min_readiness_chars, 50);
        assert_eq!(config.summarizer.backend, "huggingface");
    }

    #[test]
    fn test_load_config_from_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".paperscout");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
[search]
max_results_cap = 20

[summarizer.tiers]
short = 60
medium = 120
long = 300
"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.search.max_results_cap, 20);
        assert_eq!(config.summarizer.tiers.long, 300);
        assert_eq!(config.pipeline.keyword_count, 8);
    }

    #[test]
    fn test_load_config_invalid_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".paperscout");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[summarizer.tiers]\nshort = 300\nmedium = 200\nlong = 100\n",
        )
        .unwrap();

        let err = load_config(Some(dir.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_resolve_api_key_prefers_inline() {
        let config = SummarizerConfig {
            api_key: Some("sk-inline".to_string()),
            api_key_env: "PAPERSCOUT_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));

        let missing = SummarizerConfig {
            api_key: None,
            api_key_env: "PAPERSCOUT_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(missing.resolve_api_key().is_none());
    }
}
