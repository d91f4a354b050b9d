//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [[stages]]
//! name = "sentences"
//!
//! [[stages]]
//! name = "parser"
//! tolerant = true
//! model = "models/parser.bin"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::stages::STANDARD_ORDER;
use crate::{ConfigError, Tolerance};

/// Ordered stage list with per-stage tolerance flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// One of the built-in stage names.
    pub name: String,
    /// Unsatisfied constraints are logged instead of failing the document.
    #[serde(default)]
    pub tolerant: bool,
    /// Model file for the stage, if it uses one.
    #[serde(default)]
    pub model: Option<PathBuf>,
}

impl StageConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tolerant: false,
            model: None,
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        if self.tolerant {
            Tolerance::Tolerant
        } else {
            Tolerance::Intolerant
        }
    }
}

impl PipelineConfig {
    /// Every built-in stage, in standard order, all intolerant.
    pub fn standard() -> Self {
        Self {
            stages: STANDARD_ORDER.iter().map(|name| StageConfig::new(name)).collect(),
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Mark `stage` tolerant. Unknown names are left for
    /// [`Pipeline::from_config`](crate::Pipeline::from_config) to reject.
    pub fn tolerate(mut self, stage: &str) -> Self {
        for config in self.stages.iter_mut().filter(|config| config.name == stage) {
            config.tolerant = true;
        }
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::standard()
    }
}
