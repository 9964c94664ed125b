//! Configuration for the entry point
//!
//! Loaded from `.treeshift.json`; every field has a serde default so a
//! partial file (or `{}`) is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use treeshift_ast::{LanguageId, PrintOptions};

use crate::core::error::{CoreError, Result, ResultExt};

/// Name of the config file looked up by [`CoreConfig::discover`]
pub const CONFIG_FILE_NAME: &str = ".treeshift.json";

/// Configuration loaded from .treeshift.json
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct CoreConfig {
    /// Grammar used when the entry point is given source text
    #[serde(default)]
    pub language: LanguageId,

    /// Accept trees containing ERROR or MISSING nodes
    #[serde(default)]
    pub allow_parse_errors: bool,

    /// Printer settings
    #[serde(default)]
    pub print: PrintOptions,
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: LanguageId) -> Self {
        self.language = language;
        self
    }

    pub fn with_parse_errors(mut self, allow: bool) -> Self {
        self.allow_parse_errors = allow;
        self
    }

    pub fn with_print(mut self, print: PrintOptions) -> Self {
        self.print = print;
        self
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)
            .map_err(CoreError::from)
            .context(format!("reading {}", path.display()))?;
        let config: CoreConfig = serde_json::from_str(&text)
            .map_err(CoreError::from)
            .context(format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.treeshift.json` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.language == LanguageId::Unknown {
            return Err(CoreError::invalid_config("language must name a bundled grammar"));
        }
        if self.print.separator.is_empty() {
            return Err(CoreError::invalid_config("print.separator must not be empty"));
        }
        Ok(())
    }
}
