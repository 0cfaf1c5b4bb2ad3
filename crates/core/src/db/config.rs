use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::services::table::SortSpec;

/// Default extension of call-graph export files.
pub const DEFAULT_EXPORT_EXTENSION: &str = "BinExport";

/// Serializable viewer configuration (JSON or YAML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Extension of the export files next to the match database.
    #[serde(default = "default_export_extension")]
    pub export_extension: String,
    #[serde(default)]
    pub default_sort: SortSpec,
}

fn default_export_extension() -> String {
    DEFAULT_EXPORT_EXTENSION.to_string()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { export_extension: default_export_extension(), default_sort: SortSpec::default() }
    }
}

/// Load a viewer config from disk; the format follows the file extension.
pub fn load_viewer_config(path: &Path) -> Result<ViewerConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read viewer config at {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(&body).context("Failed to parse viewer config JSON"),
        "yaml" | "yml" => {
            serde_yaml::from_str(&body).context("Failed to parse viewer config YAML")
        }
        other => Err(anyhow!(
            "Unsupported viewer config format '{}' ({}); expected json, yaml or yml",
            other,
            path.display()
        )),
    }
}

/// Load the config at `path` if given, otherwise return defaults.
pub fn load_viewer_config_or_default(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(p) => load_viewer_config(p),
        None => Ok(ViewerConfig::default()),
    }
}
