//! Preview engine configuration.

use grove_types::ThemeVariant;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Engine configuration matching the grove.yml schema. Every field has
/// a default, so an empty or missing file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// URL prefix for resolved relative assets.
    #[serde(default = "default_file_base")]
    pub file_base: String,

    #[serde(default)]
    pub theme: ThemeVariant,

    /// Fence languages materialized as diagram containers.
    #[serde(default = "default_diagram_languages")]
    pub diagram_languages: Vec<String>,

    /// Milliseconds the render pane's own scroll echo stays suppressed
    /// after a programmatic write.
    #[serde(default = "default_suppress_window_ms")]
    pub suppress_window_ms: f64,

    /// Whether the source pane shows the frontmatter block. When it
    /// does, the preview strips it before rendering.
    #[serde(default = "default_true")]
    pub show_frontmatter: bool,
}

fn default_file_base() -> String {
    String::from("/api/file/")
}

fn default_diagram_languages() -> Vec<String> {
    vec![String::from("mermaid")]
}

fn default_suppress_window_ms() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            file_base: default_file_base(),
            theme: ThemeVariant::default(),
            diagram_languages: default_diagram_languages(),
            suppress_window_ms: default_suppress_window_ms(),
            show_frontmatter: true,
        }
    }
}

impl PreviewConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }
}
