//! Per-invocation application context.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::Config;
use crate::core::Rubric;
use crate::error::{AssessError, Result};
use crate::explain::{ExplanationChain, remote_chain};
use crate::guidance::GuidanceTable;

#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub project_root: PathBuf,
    pub json: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;
        tracing::debug!(?config, "configuration loaded");
        Ok(Self {
            config,
            config_path: cli.config.clone(),
            project_root,
            json: cli.json,
        })
    }

    /// Rubric from the override path or `assessment.rubric`.
    pub fn load_rubric(&self, override_path: Option<&Path>) -> Result<Rubric> {
        let path = override_path
            .or(self.config.assessment.rubric.as_deref())
            .ok_or_else(|| AssessError::MissingConfig("assessment.rubric".to_string()))?;
        Rubric::load(path)
    }

    /// Guidance from the override path or `assessment.guidance`. When neither
    /// is set and `required` is false, a table holding only the generic
    /// fallback is used.
    pub fn load_guidance(
        &self,
        override_path: Option<&Path>,
        required: bool,
    ) -> Result<GuidanceTable> {
        match override_path.or(self.config.assessment.guidance.as_deref()) {
            Some(path) => GuidanceTable::load(path),
            None if required => Err(AssessError::MissingConfig("assessment.guidance".to_string())),
            None => {
                tracing::warn!(
                    "no guidance document configured, explanations fall back to generic text"
                );
                Ok(GuidanceTable::fallback_only())
            }
        }
    }

    /// Remote explanation chain, unless disabled or unconfigured.
    pub fn remote_chain(&self, no_remote: bool) -> Result<Option<ExplanationChain>> {
        if no_remote {
            tracing::debug!("remote explanations disabled by flag");
            return Ok(None);
        }
        remote_chain(self.config.explain.remote_settings(), &self.config.explain.variants)
    }

    /// Config files consulted, in merge order.
    #[must_use]
    pub fn config_sources(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.config_path {
            return vec![path.clone()];
        }
        if let Ok(path) = std::env::var("ASSESSOR_CONFIG") {
            return vec![PathBuf::from(path)];
        }
        let mut sources = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            sources.push(dir.join("assessor/config.toml"));
        }
        sources.push(self.project_root.join(crate::config::PROJECT_CONFIG_FILE));
        sources
    }
}
