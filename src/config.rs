//! Notebook configuration stored in `.mindjungle/config.yaml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MindJungleError, Result};
use crate::export::ExportFormat;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub autosave: AutosaveConfig,
    pub export: ExportConfig,
}

/// Autosave behaviour of the draft engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before a draft is written.
    pub quiet_period_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 600,
        }
    }
}

impl AutosaveConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Trailing label of APA citations.
    pub citation_label: String,
    pub default_format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            citation_label: "MindJungle Manuscript".to_string(),
            default_format: ExportFormat::Markdown,
        }
    }
}

impl Config {
    /// Load `config.yaml` from the notebook directory, falling back to
    /// defaults when the file does not exist.
    pub fn load(notebook_dir: &Path) -> Result<Self> {
        let path = notebook_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `config.yaml` in the notebook directory.
    pub fn save(&self, notebook_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(notebook_dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.autosave.quiet_period_ms == 0 {
            return Err(MindJungleError::Config(
                "autosave.quiet_period_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
