//! Pipeline settings
//!
//! All tunables in one place. Loaded from TOML when a file exists, otherwise
//! defaults, then overlaid with the environment (`API_KEY`, `MODEL_NAME`,
//! `BASE_URL`, `MAX_SEARCH_RESULTS`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Generation service.
    pub llm: LlmSettings,
    /// Bibliographic search service.
    pub search: SearchSettings,
    /// Retry budget around the search call.
    pub retry: RetrySettings,
    /// Keyword triggers for the outer classifier.
    pub classifier: ClassifierSettings,
    /// Executor limits.
    pub graph: GraphSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenAI-compatible endpoint root (no trailing `/chat/completions`).
    pub base_url: String,
    pub model: String,
    /// Usually supplied through `API_KEY` rather than the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub base_url: String,
    /// Contact address sent in the User-Agent (polite pool).
    pub mailto: String,
    pub timeout_secs: u64,
    /// Requested result count; the retrieve stage never returns more than 5.
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay_ms: u64,
}

/// Keyword triggers, matched as substrings of the lowercased query.
/// Checked in order: research, theory, coding. No match means "planning".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub research: Vec<String>,
    pub theory: Vec<String>,
    pub coding: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Maximum node executions per run.
    pub recursion_limit: usize,
}

// ============================================================
// Defaults
// ============================================================

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "qwen3-32b".into(),
            api_key: None,
            temperature: None,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openalex.org".into(),
            mailto: "litgraph@example.com".into(),
            timeout_secs: 10,
            max_results: 5,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3, delay_ms: 2_000 }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            research: words(&["paper", "literature", "research", "study"]),
            theory: words(&["theory", "concept", "explain", "qué es", "que es"]),
            coding: words(&["code", "python", "bug", "error", "implement"]),
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self { recursion_limit: 25 }
    }
}

// ============================================================
// Loading
// ============================================================

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when it is absent.
    /// A file that exists but does not parse is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = match std::fs::read_to_string(path) {
            Ok(content) => {
                let parsed: Settings = toml::from_str(&content).map_err(|e| {
                    Error::configuration(format!("failed to parse {}: {}", path.display(), e))
                })?;
                tracing::info!("Loaded settings from {}", path.display());
                parsed
            }
            Err(_) => {
                tracing::info!("No settings at {} - using defaults", path.display());
                Self::default()
            }
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("API_KEY").filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("MODEL_NAME").filter(|m| !m.is_empty()) {
            self.llm.model = model;
        }
        if let Some(url) = lookup("BASE_URL").filter(|u| !u.is_empty()) {
            self.llm.base_url = url;
        }
        if let Some(raw) = lookup("MAX_SEARCH_RESULTS").filter(|r| !r.trim().is_empty()) {
            self.search.max_results = raw.trim().parse().map_err(|_| {
                Error::configuration(format!("MAX_SEARCH_RESULTS is not a number: {raw}"))
            })?;
        }
        Ok(())
    }

    /// The generation API key, or a configuration error naming the variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::configuration("API_KEY is not set"))
    }

    /// Render the settings as TOML (for `litgraph config`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("failed to render settings: {e}")))
    }
}

impl RetrySettings {
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.delay_ms)
    }
}
