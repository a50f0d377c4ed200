//! Configuration management for mdcomp.
//!
//! Parses `mdcomp.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [render]
//! gfm = true
//! timeout_ms = 5000
//!
//! [components.Alert]
//! template = '<div class="alert alert-{{type}}">{{{content}}}</div>'
//! aliases = ["Callout"]
//! [components.Alert.params]
//! type = "string"
//! content = "default-slot"
//!
//! [components.Card]
//! template_file = "${THEME_DIR:-theme}/card.html"
//! [components.Card.params]
//! title = { type = "string", required = true }
//! header = "named-slot"
//! ```
//!
//! `template_file` supports `${VAR}` and `${VAR:-default}` expansion and is
//! resolved relative to the directory of the config file.

mod expand;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mdcomp_components::is_component_name;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override GFM extensions.
    pub gfm: Option<bool>,
    /// Override host invocation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdcomp.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Template components keyed by tag name.
    pub components: BTreeMap<String, ComponentConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether GFM extensions (tables, strikethrough, task lists) are enabled.
    pub gfm: bool,
    /// Host invocation timeout in milliseconds, 0 to wait forever.
    pub timeout_ms: u64,
    /// Capacity of the bounded host queue.
    pub queue_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            timeout_ms: 5000,
            queue_capacity: 64,
        }
    }
}

impl RenderConfig {
    /// Invocation timeout, `None` when disabled.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// A component rendered from a template.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Inline template.
    pub template: Option<String>,
    /// Template file (as written in the config).
    pub template_file: Option<String>,
    /// Additional tag names for the same component.
    pub aliases: Vec<String>,
    /// Declared parameters keyed by name.
    pub params: BTreeMap<String, ParamConfig>,

    /// Resolved template file path (set after loading).
    #[serde(skip)]
    pub template_path: Option<PathBuf>,
}

impl ComponentConfig {
    /// Read the template source, inline or from the resolved file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TemplateFile` if the file cannot be read and
    /// `ConfigError::Validation` if no template is configured.
    pub fn read_template(&self) -> Result<String, ConfigError> {
        if let Some(template) = &self.template {
            return Ok(template.clone());
        }
        let path = self
            .template_path
            .clone()
            .or_else(|| self.template_file.as_ref().map(PathBuf::from))
            .ok_or_else(|| ConfigError::Validation("component has no template".to_owned()))?;
        std::fs::read_to_string(&path).map_err(|source| ConfigError::TemplateFile { path, source })
    }

    fn default_slots(&self) -> usize {
        self.params
            .values()
            .filter(|param| param.param_type() == ParamTypeName::DefaultSlot)
            .count()
    }
}

/// Parameter declaration: a bare type name or `{ type, required }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParamConfig {
    Short(ParamTypeName),
    Long {
        #[serde(rename = "type")]
        ty: ParamTypeName,
        #[serde(default)]
        required: bool,
    },
}

impl ParamConfig {
    #[must_use]
    pub fn param_type(&self) -> ParamTypeName {
        match *self {
            Self::Short(ty) | Self::Long { ty, .. } => ty,
        }
    }

    #[must_use]
    pub fn required(&self) -> bool {
        matches!(self, Self::Long { required: true, .. })
    }
}

/// Parameter type names accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamTypeName {
    String,
    Integer,
    Boolean,
    Float,
    DefaultSlot,
    NamedSlot,
}

impl fmt::Display for ParamTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::DefaultSlot => "default-slot",
            Self::NamedSlot => "named-slot",
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Template file could not be read.
    #[error("Cannot read template {}: {source}", path.display())]
    TemplateFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`components.Card.template_file`").
        field: String,
        /// Error message (e.g., "${`THEME_DIR`} not set").
        message: String,
    },
}

/// Whether `name` can be referenced from a template placeholder.
fn is_param_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdcomp.toml` in current directory and parents,
    /// falling back to defaults with no components.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };
        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
        if let Some(timeout_ms) = settings.timeout_ms {
            self.render.timeout_ms = timeout_ms;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "render.queue_capacity must be greater than 0".to_owned(),
            ));
        }

        let mut tags: Vec<&str> = Vec::new();
        for (name, component) in &self.components {
            Self::validate_component(name, component)?;
            for tag in std::iter::once(name).chain(&component.aliases) {
                if !is_component_name(tag) {
                    return Err(ConfigError::Validation(format!(
                        "components.{name}: '{tag}' is not a valid component name \
                         (expected an upper-case letter followed by letters or digits)"
                    )));
                }
                if tags.contains(&tag.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "components.{name}: tag name '{tag}' is already in use"
                    )));
                }
                tags.push(tag);
            }
        }

        Ok(())
    }

    fn validate_component(name: &str, component: &ComponentConfig) -> Result<(), ConfigError> {
        match (&component.template, &component.template_file) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "components.{name}: exactly one of template or template_file must be set"
                )));
            }
        }
        if let Some(param) = component.params.keys().find(|param| !is_param_name(param)) {
            return Err(ConfigError::Validation(format!(
                "components.{name}: invalid parameter name '{param}'"
            )));
        }
        if component.default_slots() > 1 {
            return Err(ConfigError::Validation(format!(
                "components.{name}: at most one default-slot parameter is allowed"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in template file paths.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (name, component) in &mut self.components {
            if let Some(ref file) = component.template_file {
                let field = format!("components.{name}.template_file");
                component.template_file = Some(expand::expand_env(file, &field)?);
            }
        }
        Ok(())
    }

    /// Resolve template file paths relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        for component in self.components.values_mut() {
            component.template_path = component
                .template_file
                .as_deref()
                .map(|file| config_dir.join(file));
        }
    }
}
