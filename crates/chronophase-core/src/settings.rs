//! Registry settings: which providers to install, with what options.
//!
//! Settings files are JSON, YAML or TOML:
//!
//! ```toml
//! [[providers]]
//! name = "core"
//!
//! [[providers]]
//! name = "excel"
//! options = { date_system = "1904" }
//! ```
//!
//! An empty provider list means every compiled-in provider with its defaults.

use crate::hierarchy::RegistryError;
use crate::value::{Options, Value};
use serde::{Deserialize, Serialize};

/// Registry settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Providers to install, in order.
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
}

/// One provider entry in a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Provider name, e.g. `core` or `excel`.
    pub name: String,

    /// Provider-specific options.
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options: Options,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Options::new(),
        }
    }

    /// Set an option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider.
    pub fn provider(mut self, spec: ProviderSpec) -> Self {
        self.providers.push(spec);
        self
    }

    /// Whether every compiled-in provider should be installed.
    pub fn uses_all_providers(&self) -> bool {
        self.providers.is_empty()
    }

    /// Parse settings, taking the format from the extension of `path`.
    /// Paths without a known extension are read as YAML.
    pub fn from_bytes(data: &[u8], path: Option<&str>) -> Result<Self, SettingsError> {
        let format = path
            .and_then(SettingsFormat::from_path)
            .unwrap_or(SettingsFormat::Yaml);
        format.parse(data)
    }

    /// Parse settings in the named format (`json`, `yaml`, `yml` or `toml`).
    pub fn from_bytes_format(data: &[u8], format: &str) -> Result<Self, SettingsError> {
        format.parse::<SettingsFormat>()?.parse(data)
    }

    /// Write settings in the named format.
    pub fn to_bytes(&self, format: &str) -> Result<Vec<u8>, SettingsError> {
        format.parse::<SettingsFormat>()?.write(self)
    }
}

/// On-disk settings formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Yaml,
    Toml,
}

impl SettingsFormat {
    /// Format implied by a file extension, if any.
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        ext.parse().ok()
    }

    fn parse(self, data: &[u8]) -> Result<Settings, SettingsError> {
        let parsed: Result<Settings, String> = match self {
            SettingsFormat::Json => serde_json::from_slice(data).map_err(|e| e.to_string()),
            SettingsFormat::Yaml => serde_yaml::from_slice(data).map_err(|e| e.to_string()),
            SettingsFormat::Toml => std::str::from_utf8(data)
                .map_err(|e| format!("settings are not UTF-8: {e}"))
                .and_then(|text| toml::from_str(text).map_err(|e| e.to_string())),
        };
        parsed.map_err(|message| SettingsError::Parse { format: self, message })
    }

    fn write(self, settings: &Settings) -> Result<Vec<u8>, SettingsError> {
        let written = match self {
            SettingsFormat::Json => serde_json::to_vec_pretty(settings).map_err(|e| e.to_string()),
            SettingsFormat::Yaml => serde_yaml::to_string(settings)
                .map(String::into_bytes)
                .map_err(|e| e.to_string()),
            SettingsFormat::Toml => toml::to_string_pretty(settings)
                .map(String::into_bytes)
                .map_err(|e| e.to_string()),
        };
        written.map_err(|message| SettingsError::Serialize { format: self, message })
    }
}

impl std::str::FromStr for SettingsFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SettingsFormat::Json),
            "yaml" | "yml" => Ok(SettingsFormat::Yaml),
            "toml" => Ok(SettingsFormat::Toml),
            _ => Err(SettingsError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for SettingsFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SettingsFormat::Json => "JSON",
            SettingsFormat::Yaml => "YAML",
            SettingsFormat::Toml => "TOML",
        })
    }
}

/// Errors from reading settings or building a registry from them.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid {format} settings: {message}")]
    Parse {
        format: SettingsFormat,
        message: String,
    },

    #[error("cannot write settings as {format}: {message}")]
    Serialize {
        format: SettingsFormat,
        message: String,
    },

    #[error("no settings format named '{0}', expected json, yaml or toml")]
    UnknownFormat(String),

    #[error("unknown provider '{name}'")]
    UnknownProvider { name: String },

    #[error("invalid option '{key}' for provider '{provider}': {message}")]
    InvalidOption {
        provider: String,
        key: String,
        message: String,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
