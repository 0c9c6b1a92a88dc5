use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lens_measure::FormatRule;
use lens_sequence::ActionSpec;
use lens_types::NodeKey;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Configuration of one inspection run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Addresses discovery starts from.
    pub seeds: Vec<String>,
    /// Addresses recorded but not traversed through.
    #[serde(default)]
    pub stop_list: Vec<String>,
    /// Directory report files are written to.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Directory of the persistent metadata cache; in-memory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub formats: Vec<FormatRule>,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            stop_list: Vec::new(),
            report_dir: default_report_dir(),
            cache_dir: None,
            actions: Vec::new(),
            formats: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Seeds must be present and action labels unique.
    pub fn validate(&self) -> SdkResult<()> {
        if self.seeds.is_empty() {
            return Err(SdkError::Config("at least one seed address is required".into()));
        }
        let mut labels = HashSet::new();
        for action in &self.actions {
            let label = action.label();
            if !labels.insert(label.clone()) {
                return Err(SdkError::Config(format!("duplicate action label {label:?}")));
            }
        }
        for rule in &self.formats {
            if rule.raw && (rule.decimals.is_some() || rule.precision.is_some()) {
                return Err(SdkError::Config(
                    "a raw format rule cannot also set decimals or precision".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn seed_keys(&self) -> Vec<NodeKey> {
        self.seeds.iter().map(NodeKey::new).collect()
    }

    pub fn stop_keys(&self) -> Vec<NodeKey> {
        self.stop_list.iter().map(NodeKey::new).collect()
    }
}
