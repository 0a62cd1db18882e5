//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/facettree/facettree.toml`
//! 3. Local config: explicit `--config` file, or `.facettree.toml` next to the payload
//! 4. Environment variables: `FACETTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{BuildOptions, RenderOptions};

/// Default label of the synthetic root grouping all categories.
pub const DEFAULT_ROOT_LABEL: &str = "All Categories";

/// Unified configuration for facettree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Label of the wrapping display root; empty disables the wrapping root
    pub root_label: String,
    /// Collapse parents at this depth after building
    pub collapse_depth: Option<usize>,
    /// Show aggregate leaf counts next to parent labels
    pub show_counts: bool,
    /// Render hidden items too
    pub show_hidden: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            collapse_depth: None,
            show_counts: true,
            show_hidden: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_label: Option<String>,
    pub collapse_depth: Option<usize>,
    pub show_counts: Option<bool>,
    pub show_hidden: Option<bool>,
}

/// Get the XDG config directory for facettree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "facettree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("facettree.toml"))
}

/// Get the path to the local config file next to a payload.
pub fn local_config_path(payload: &Path) -> PathBuf {
    payload
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(".facettree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_label: overlay
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            collapse_depth: overlay.collapse_depth.or(self.collapse_depth),
            show_counts: overlay.show_counts.unwrap_or(self.show_counts),
            show_hidden: overlay.show_hidden.unwrap_or(self.show_hidden),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional local config file; skipped when it does not exist
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            if local_path.exists() {
                let raw = load_raw_settings(local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current, env_source())
    }

    /// Apply FACETTREE_* variables from `source` as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        source: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_label") {
            settings.root_label = val;
        }
        if let Ok(val) = config.get_int("collapse_depth") {
            settings.collapse_depth = usize::try_from(val).ok();
        }
        if let Ok(val) = config.get_bool("show_counts") {
            settings.show_counts = val;
        }
        if let Ok(val) = config.get_bool("show_hidden") {
            settings.show_hidden = val;
        }

        Ok(settings)
    }

    /// Builder options derived from these settings.
    pub fn build_options(&self) -> BuildOptions {
        let label = self.root_label.trim();
        BuildOptions {
            root_label: (!label.is_empty()).then(|| label.to_string()),
            collapse_depth: self.collapse_depth,
        }
    }

    /// Rendering switches derived from these settings.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_counts: self.show_counts,
            show_hidden: self.show_hidden,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# facettree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/facettree/facettree.toml
#   Local:  --config FILE, or .facettree.toml next to the payload
#   Env:    FACETTREE_* environment variables (explicit overrides)

# Label of the synthetic root grouping all categories ("" to disable)
# root_label = "All Categories"

# Collapse every category at this depth after building
# collapse_depth = 2

# Show leaf counts next to category labels
# show_counts = true

# Render items hidden by collapsed parents
# show_hidden = false
"#
        .to_string()
    }
}

/// `FACETTREE_ROOT_LABEL` style variables; `__` separates nested keys.
fn env_source() -> Environment {
    Environment::with_prefix("FACETTREE")
        .prefix_separator("_")
        .separator("__")
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
