use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assessment::DEFAULT_RESULTS_FILE;
use crate::error::{AssessError, Result};
use crate::explain::{MIN_EXPLANATION_CHARS, RemoteSettings};

/// Name of the project-level config file, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "assessor.toml";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub explain: ExplainConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path (argument or `ASSESSOR_CONFIG`) is the only file read
    /// and must exist. Otherwise the global file and then `assessor.toml` in
    /// `project_root` are merged when present. `ASSESSOR_*` variables are
    /// applied last.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("ASSESSOR_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                AssessError::Config(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the explanation path cannot honour.
    fn validate(&self) -> Result<()> {
        if self.explain.max_chars < MIN_EXPLANATION_CHARS {
            return Err(AssessError::Config(format!(
                "explain.max_chars must be at least {MIN_EXPLANATION_CHARS}, got {}",
                self.explain.max_chars
            )));
        }
        Ok(())
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            tracing::debug!("no user config directory, skipping global config");
            return Ok(None);
        };
        Self::load_patch(&dir.join("assessor/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| AssessError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| AssessError::Config(format!("parse config {}: {err}", path.display())))?;
        tracing::debug!(path = %path.display(), "config file merged");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.explain {
            self.explain.merge(patch);
        }
        if let Some(patch) = patch.assessment {
            self.assessment.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let env = EnvReader { lookup };

        if let Some(value) = env.string("ASSESSOR_API_KEY") {
            self.explain.api_key = Some(value);
        }
        if let Some(value) = env.string("ASSESSOR_BASE_URL") {
            self.explain.base_url = value;
        }
        if let Some(values) = env.list("ASSESSOR_VARIANTS") {
            self.explain.variants = values;
        }
        if let Some(value) = env.bool("ASSESSOR_REMOTE_ENABLED") {
            self.explain.enabled = value;
        }
        if let Some(value) = env.duration("ASSESSOR_TIMEOUT")? {
            self.explain.timeout = value;
        }
        if let Some(value) = env.parse::<u32>("ASSESSOR_MAX_TOKENS")? {
            self.explain.max_tokens = value;
        }
        if let Some(value) = env.parse::<usize>("ASSESSOR_MAX_CHARS")? {
            self.explain.max_chars = value;
        }
        if let Some(value) = env.parse::<f32>("ASSESSOR_TEMPERATURE")? {
            self.explain.temperature = value;
        }

        if let Some(value) = env.string("ASSESSOR_RUBRIC") {
            self.assessment.rubric = Some(PathBuf::from(value));
        }
        if let Some(value) = env.string("ASSESSOR_GUIDANCE") {
            self.assessment.guidance = Some(PathBuf::from(value));
        }
        if let Some(value) = env.string("ASSESSOR_RESULTS") {
            self.assessment.results = PathBuf::from(value);
        }
        if let Some(value) = env.parse::<usize>("ASSESSOR_TOP_PRIORITIES")? {
            self.assessment.top_priorities = value;
        }

        if let Some(value) = env.parse::<usize>("ASSESSOR_WRAP_WIDTH")? {
            self.output.wrap_width = value;
        }

        Ok(())
    }

    /// Copy with secrets replaced, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.explain.api_key.is_some() {
            copy.explain.api_key = Some(REDACTED.to_string());
        }
        copy
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// No default: without a key the remote service is never contacted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model names, tried in order.
    #[serde(default = "default_variants")]
    pub variants: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_variants() -> Vec<String> {
    vec!["gpt-4o-mini".to_string(), "gpt-4.1-nano".to_string()]
}

const fn default_true() -> bool {
    true
}

const fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

const fn default_max_tokens() -> u32 {
    300
}

const fn default_max_chars() -> usize {
    1200
}

const fn default_temperature() -> f32 {
    0.4
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            variants: default_variants(),
            enabled: true,
            timeout: default_timeout(),
            max_tokens: default_max_tokens(),
            max_chars: default_max_chars(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for ExplainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("variants", &self.variants)
            .field("enabled", &self.enabled)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("max_chars", &self.max_chars)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ExplainConfig {
    fn merge(&mut self, patch: ExplainPatch) {
        if let Some(value) = patch.api_key {
            self.api_key = Some(value);
        }
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.variants {
            self.variants = value;
        }
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.timeout {
            self.timeout = value;
        }
        if let Some(value) = patch.max_tokens {
            self.max_tokens = value;
        }
        if let Some(value) = patch.max_chars {
            self.max_chars = value;
        }
        if let Some(value) = patch.temperature {
            self.temperature = value;
        }
    }

    /// Connection settings, or `None` when remote explanations are disabled
    /// or no API key is configured.
    #[must_use]
    pub fn remote_settings(&self) -> Option<RemoteSettings> {
        if !self.enabled {
            return None;
        }
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(RemoteSettings {
            base_url: self.base_url.clone(),
            api_key: api_key.to_string(),
            timeout: self.timeout,
            max_tokens: self.max_tokens,
            max_chars: self.max_chars,
            temperature: self.temperature,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<PathBuf>,
    #[serde(default = "default_results")]
    pub results: PathBuf,
    /// Weak areas explained by the CLI by default.
    #[serde(default = "default_top_priorities")]
    pub top_priorities: usize,
}

fn default_results() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_FILE)
}

const fn default_top_priorities() -> usize {
    3
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            rubric: None,
            guidance: None,
            results: default_results(),
            top_priorities: default_top_priorities(),
        }
    }
}

impl AssessmentConfig {
    fn merge(&mut self, patch: AssessmentPatch) {
        if let Some(value) = patch.rubric {
            self.rubric = Some(value);
        }
        if let Some(value) = patch.guidance {
            self.guidance = Some(value);
        }
        if let Some(value) = patch.results {
            self.results = value;
        }
        if let Some(value) = patch.top_priorities {
            self.top_priorities = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

const fn default_wrap_width() -> usize {
    80
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            wrap_width: default_wrap_width(),
        }
    }
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.wrap_width {
            self.wrap_width = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub explain: Option<ExplainPatch>,
    pub assessment: Option<AssessmentPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Clone, Default, Deserialize)]
struct ExplainPatch {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub variants: Option<Vec<String>>,
    pub enabled: Option<bool>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub max_tokens: Option<u32>,
    pub max_chars: Option<usize>,
    pub temperature: Option<f32>,
}

impl std::fmt::Debug for ExplainPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainPatch")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("variants", &self.variants)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AssessmentPatch {
    pub rubric: Option<PathBuf>,
    pub guidance: Option<PathBuf>,
    pub results: Option<PathBuf>,
    pub top_priorities: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputPatch {
    pub wrap_width: Option<usize>,
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.string(key).map(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
                AssessError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn duration(&self, key: &str) -> Result<Option<Duration>> {
        match self.string(key) {
            Some(value) => humantime_serde::re::humantime::parse_duration(value.trim())
                .map(Some)
                .map_err(|err| AssessError::Config(format!("invalid {key} value {value}: {err}"))),
            None => Ok(None),
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.string(key).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
